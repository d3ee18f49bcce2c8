//! Everything an ability behaviour may touch while it runs

use serde::{Deserialize, Serialize};

use crate::abilities::{AbilityDefinition, AbilitySpecHandle, ComboStep, EndAbilityFlags};
use crate::character::{CharacterEvent, CharacterState};
use crate::core::types::ActorId;
use crate::effects::{catalog, ActiveEffectHandle, EffectDefinition, EffectSpec, Modifier};
use crate::tags::{names, GameplayTag, TagContainer};
use crate::world::WorldServices;

/// Payload of a gameplay event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameplayEventData {
    pub tag: GameplayTag,
    pub instigator: Option<ActorId>,
    /// Instigator's owned tags when the event was raised
    pub instigator_tags: TagContainer,
    pub target: Option<ActorId>,
    pub magnitude: f32,
}

impl GameplayEventData {
    pub fn new(tag: GameplayTag) -> Self {
        Self {
            tag,
            instigator: None,
            instigator_tags: TagContainer::new(),
            target: None,
            magnitude: 0.0,
        }
    }

    pub fn from_instigator(mut self, instigator: ActorId, tags: TagContainer) -> Self {
        self.instigator = Some(instigator);
        self.instigator_tags = tags;
        self
    }

    pub fn to_target(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }
}

/// What the system should do after a behaviour hook returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityFlow {
    Continue,
    End(EndAbilityFlags),
}

pub struct AbilityContext<'a> {
    pub handle: AbilitySpecHandle,
    pub owner: ActorId,
    pub definition: &'a AbilityDefinition,
    pub state: &'a mut CharacterState,
    pub services: &'a mut WorldServices,
    pub combo_step: &'a mut ComboStep,
    /// Ability whose montage was displaced during this hook
    pub displaced: Option<AbilitySpecHandle>,
}

impl<'a> AbilityContext<'a> {
    /// Cost and cooldown check without side effects
    pub fn can_commit(&self) -> bool {
        check_commit(self.definition, self.state).is_ok()
    }

    /// Check, then spend the cost and start the cooldown
    pub fn commit(&mut self) -> bool {
        if let Err(reason) = check_commit(self.definition, self.state) {
            tracing::debug!("{} failed to commit: {}", self.definition.class, reason);
            return false;
        }

        if let Some(cost) = self.definition.cost {
            let effect = EffectDefinition::instant(
                format!("Cost({})", self.definition.class),
                vec![Modifier::additive(cost.attribute, -cost.amount)],
            );
            self.state
                .apply_effect(EffectSpec::new(effect).with_instigator(self.owner));
        }

        if let Some(cooldown) = &self.definition.cooldown {
            let effect = catalog::cooldown(cooldown.tag.clone(), cooldown.duration);
            self.state
                .apply_effect(EffectSpec::new(effect).with_instigator(self.owner));
        }

        true
    }

    /// Apply the shared stamina reduction effect with a signed delta
    pub fn apply_stamina_delta(&mut self, delta: f32) {
        let spec = EffectSpec::new(catalog::stamina_reduction())
            .with_set_by_caller(GameplayTag::from_static(names::STAMINA_REDUCTION), delta)
            .with_instigator(self.owner);
        self.state.apply_effect(spec);
    }

    /// Apply a periodic stamina delta, returning the effect to remove later
    pub fn apply_periodic_stamina_delta(
        &mut self,
        delta: f32,
        period: f32,
    ) -> Option<ActiveEffectHandle> {
        let spec = EffectSpec::new(catalog::periodic_stamina_reduction(period))
            .with_set_by_caller(GameplayTag::from_static(names::STAMINA_REDUCTION), delta)
            .with_instigator(self.owner);
        self.state.apply_effect(spec)
    }

    pub fn play_sound(&mut self, sound: &str) {
        self.state.push_event(CharacterEvent::PlaySound {
            sound: sound.to_string(),
        });
    }
}

/// Reason commit would fail, if any
pub(crate) fn check_commit(
    definition: &AbilityDefinition,
    state: &CharacterState,
) -> std::result::Result<(), String> {
    if let Some(cost) = definition.cost {
        let available = state.attributes().get(cost.attribute);
        if available < cost.amount {
            return Err(format!(
                "{:?} {} below cost {}",
                cost.attribute, available, cost.amount
            ));
        }
    }

    if let Some(cooldown) = &definition.cooldown {
        if state.tags.has(&cooldown.tag) {
            return Err(format!("on cooldown ({})", cooldown.tag));
        }
    }

    Ok(())
}
