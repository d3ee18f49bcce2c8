//! Ability system
//!
//! Abilities are granted to a character as specs. Each spec owns one
//! behaviour instance which activates and ends repeatedly over the
//! character's lifetime:
//!
//! ```text
//! Inactive -> Committing -> Active -> Ended { replicate, cancelled }
//!                ^                         |
//!                +-------------------------+
//! ```

pub mod context;
pub mod damage;
pub mod definition;
pub mod jump;
pub mod loadout;
pub mod montage;
pub mod spec;
pub mod sprint;
pub mod system;

pub use context::{AbilityContext, AbilityFlow, GameplayEventData};
pub use damage::{compute_damage, roll_critical, DamageRoll, ReceiveDamageAbility};
pub use definition::{
    AbilityClass, AbilityCooldown, AbilityCost, AbilityDefinition, AbilityKind, ComboStep,
    JumpSettings, MontageSettings, ReceiveDamageSettings, SprintSettings,
};
pub use jump::JumpAbility;
pub use montage::MontageAbility;
pub use spec::{AbilitySpec, AbilitySpecHandle, AbilityState, EndAbilityFlags};
pub use sprint::SprintAbility;
pub use system::AbilitySystem;

/// Behaviour hooks driven by the [`AbilitySystem`]
pub trait Activatable {
    /// Start behaviour, run after tag checks passed and owned tags were added
    fn activate(&mut self, ctx: &mut AbilityContext<'_>, trigger: Option<&GameplayEventData>) -> AbilityFlow;

    fn input_released(&mut self, _ctx: &mut AbilityContext<'_>) -> AbilityFlow {
        AbilityFlow::Continue
    }

    /// Flags used when the ability is cancelled by tag
    fn cancel_flags(&self, _ctx: &AbilityContext<'_>) -> EndAbilityFlags {
        EndAbilityFlags::new(true, true)
    }

    /// Cleanup; runs exactly once per activation
    fn end(&mut self, ctx: &mut AbilityContext<'_>, flags: EndAbilityFlags);
}

#[derive(Debug, Clone)]
pub enum AbilityInstance {
    Jump(JumpAbility),
    Sprint(SprintAbility),
    Montage(MontageAbility),
    ReceiveDamage(ReceiveDamageAbility),
}

impl AbilityInstance {
    pub fn from_kind(kind: &AbilityKind) -> Self {
        match kind {
            AbilityKind::Jump(settings) => AbilityInstance::Jump(JumpAbility::new(settings.clone())),
            AbilityKind::Sprint(settings) => {
                AbilityInstance::Sprint(SprintAbility::new(settings.clone()))
            }
            AbilityKind::Montage(settings) => {
                AbilityInstance::Montage(MontageAbility::new(settings.clone()))
            }
            AbilityKind::ReceiveDamage(settings) => {
                AbilityInstance::ReceiveDamage(ReceiveDamageAbility::new(*settings))
            }
        }
    }

    pub fn montage(&self) -> Option<&MontageAbility> {
        match self {
            AbilityInstance::Montage(montage) => Some(montage),
            _ => None,
        }
    }

    pub fn montage_mut(&mut self) -> Option<&mut MontageAbility> {
        match self {
            AbilityInstance::Montage(montage) => Some(montage),
            _ => None,
        }
    }

    fn behaviour(&mut self) -> &mut dyn Activatable {
        match self {
            AbilityInstance::Jump(a) => a,
            AbilityInstance::Sprint(a) => a,
            AbilityInstance::Montage(a) => a,
            AbilityInstance::ReceiveDamage(a) => a,
        }
    }

    fn behaviour_ref(&self) -> &dyn Activatable {
        match self {
            AbilityInstance::Jump(a) => a,
            AbilityInstance::Sprint(a) => a,
            AbilityInstance::Montage(a) => a,
            AbilityInstance::ReceiveDamage(a) => a,
        }
    }
}

impl Activatable for AbilityInstance {
    fn activate(&mut self, ctx: &mut AbilityContext<'_>, trigger: Option<&GameplayEventData>) -> AbilityFlow {
        self.behaviour().activate(ctx, trigger)
    }

    fn input_released(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityFlow {
        self.behaviour().input_released(ctx)
    }

    fn cancel_flags(&self, ctx: &AbilityContext<'_>) -> EndAbilityFlags {
        self.behaviour_ref().cancel_flags(ctx)
    }

    fn end(&mut self, ctx: &mut AbilityContext<'_>, flags: EndAbilityFlags) {
        self.behaviour().end(ctx, flags)
    }
}
