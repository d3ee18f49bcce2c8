//! Receiving staff melee damage
//!
//! Activated by the damage gameplay event. Rolls a critical hit, applies the
//! final damage to the owner's health and ends immediately.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::abilities::{
    AbilityContext, AbilityFlow, Activatable, EndAbilityFlags, GameplayEventData, ReceiveDamageSettings,
};
use crate::attributes::Attribute;
use crate::character::CharacterEvent;
use crate::effects::{catalog, EffectSpec};

/// Outcome of one damage computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub base: f32,
    pub critical: bool,
    pub amount: f32,
}

/// True with probability `chance`
pub fn roll_critical<R: Rng + ?Sized>(rng: &mut R, chance: f32) -> bool {
    rng.gen::<f32>() < chance
}

pub fn compute_damage(base: f32, critical: bool, crit_multiplier: f32) -> f32 {
    if critical {
        base * crit_multiplier
    } else {
        base
    }
}

#[derive(Debug, Clone)]
pub struct ReceiveDamageAbility {
    settings: ReceiveDamageSettings,
    last_roll: Option<DamageRoll>,
}

impl ReceiveDamageAbility {
    pub fn new(settings: ReceiveDamageSettings) -> Self {
        Self {
            settings,
            last_roll: None,
        }
    }

    pub fn last_roll(&self) -> Option<DamageRoll> {
        self.last_roll
    }
}

impl Activatable for ReceiveDamageAbility {
    fn activate(&mut self, ctx: &mut AbilityContext<'_>, trigger: Option<&GameplayEventData>) -> AbilityFlow {
        let done = AbilityFlow::End(EndAbilityFlags::new(true, false));

        let Some(event) = trigger else {
            tracing::warn!("{} activated without an event payload", ctx.definition.class);
            return done;
        };
        if event.target.is_some_and(|target| target != ctx.owner) {
            tracing::warn!("Damage event for {:?} delivered to {}", event.target, ctx.owner);
            return done;
        }
        if !ctx.commit() {
            return done;
        }

        let critical = self.settings.can_crit && roll_critical(&mut ctx.services.rng, self.settings.crit_chance);
        let amount = compute_damage(self.settings.base_damage, critical, self.settings.crit_multiplier);
        self.last_roll = Some(DamageRoll {
            base: self.settings.base_damage,
            critical,
            amount,
        });

        ctx.state.push_event(CharacterEvent::DamageTaken {
            instigator: event.instigator,
            amount,
            critical,
            knockback: self.settings.knockback_force,
            stun: self.settings.stun_duration,
        });

        let before = ctx.state.attributes().get(Attribute::Health);
        let mut spec = EffectSpec::new(catalog::staff_melee_damage()).with_set_by_caller(event.tag.clone(), -amount);
        spec.instigator = event.instigator;
        ctx.state.apply_effect(spec);

        tracing::debug!(
            "{} took {} damage (critical: {}), health {} -> {}",
            ctx.owner,
            amount,
            critical,
            before,
            ctx.state.attributes().get(Attribute::Health)
        );

        done
    }

    fn end(&mut self, _ctx: &mut AbilityContext<'_>, _flags: EndAbilityFlags) {}
}
