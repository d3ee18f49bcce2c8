//! Built-in effect definitions

use crate::attributes::{Attribute, AttributeProfile};
use crate::core::config::{CharacterDefaults, LevelingRules};
use crate::core::types::Seconds;
use crate::effects::{DurationPolicy, EffectDefinition, Magnitude, Modifier, ModifierOp};
use crate::tags::{names, GameplayTag, TagContainer};

/// Instant stamina change keyed by `Combat.Stamina.Reduction`
pub fn stamina_reduction() -> EffectDefinition {
    EffectDefinition::instant(
        "StaminaReduction",
        vec![Modifier::new(
            Attribute::Stamina,
            ModifierOp::Additive,
            Magnitude::SetByCaller(GameplayTag::from_static(names::STAMINA_REDUCTION)),
        )],
    )
}

/// Periodic variant of [`stamina_reduction`] used by sprinting
pub fn periodic_stamina_reduction(period: Seconds) -> EffectDefinition {
    EffectDefinition::periodic(
        "PeriodicStaminaReduction",
        DurationPolicy::Infinite,
        period,
        vec![Modifier::new(
            Attribute::Stamina,
            ModifierOp::Additive,
            Magnitude::SetByCaller(GameplayTag::from_static(names::STAMINA_REDUCTION)),
        )],
    )
}

pub fn attack_stamina_reduction() -> EffectDefinition {
    EffectDefinition::instant(
        "AttackStaminaReduction",
        vec![Modifier::additive(Attribute::Stamina, -5.0)],
    )
}

/// -2 stamina every 0.5s while jogging out of combat
pub fn jogging_stamina_reduction() -> EffectDefinition {
    EffectDefinition::periodic(
        "JoggingStaminaReduction",
        DurationPolicy::Infinite,
        0.5,
        vec![Modifier::additive(Attribute::Stamina, -2.0)
            .with_required(TagContainer::from_static(&[
                names::MOVEMENT_JOGGING,
                names::STATE_ALIVE,
            ]))
            .with_ignored(TagContainer::from_static(&[names::COMBAT]))],
    )
}

/// +1 stamina every 0.35s while idle
pub fn stamina_regeneration() -> EffectDefinition {
    EffectDefinition::periodic(
        "StaminaRegeneration",
        DurationPolicy::Infinite,
        0.35,
        vec![Modifier::additive(Attribute::Stamina, 1.0)
            .with_required(TagContainer::from_static(&[names::STATE_ALIVE]))
            .with_ignored(TagContainer::from_static(&[
                names::MOVEMENT_JOGGING,
                names::MOVEMENT_SPRINTING,
                names::STATE_BOUND,
                names::COMBAT,
            ]))],
    )
}

/// Health change keyed by the staff damage event tag
pub fn staff_melee_damage() -> EffectDefinition {
    EffectDefinition::instant(
        "StaffMeleeDamage",
        vec![Modifier::new(
            Attribute::Health,
            ModifierOp::Additive,
            Magnitude::SetByCaller(GameplayTag::from_static(names::DAMAGE_MELEE_STAFF)),
        )],
    )
}

pub fn experience_gain() -> EffectDefinition {
    EffectDefinition::instant(
        "ExperienceGain",
        vec![Modifier::new(
            Attribute::ExperiencePoints,
            ModifierOp::Additive,
            Magnitude::SetByCaller(GameplayTag::from_static(names::EXPERIENCE_GAIN)),
        )],
    )
}

pub fn cooldown(tag: GameplayTag, duration: Seconds) -> EffectDefinition {
    EffectDefinition::tag_grant(format!("Cooldown({tag})"), duration, TagContainer::single(tag))
}

/// Max attribute overrides for a profile at `level`
///
/// Applied on spawn and again on every level-up. Writing the experience max
/// resets experience to zero.
pub fn default_attributes(
    profile: AttributeProfile,
    defaults: &CharacterDefaults,
    leveling: &LevelingRules,
    level: u32,
) -> EffectDefinition {
    let overrides = [
        (Attribute::MaxHealth, defaults.max_health),
        (Attribute::MaxStamina, defaults.max_stamina),
        (Attribute::MaxAdrenaline, defaults.max_adrenaline),
        (Attribute::MaxExperiencePoints, leveling.max_experience_for(level)),
    ];

    let modifiers = overrides
        .into_iter()
        .filter(|(attribute, _)| profile.supports(*attribute))
        .map(|(attribute, value)| {
            Modifier::new(attribute, ModifierOp::Override, Magnitude::Constant(value))
        })
        .collect();

    EffectDefinition::instant("DefaultAttributes", modifiers)
}

/// Effects every player starts with
pub fn player_startup_effects() -> Vec<EffectDefinition> {
    vec![stamina_regeneration(), jogging_stamina_reduction()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_catalog_entries() {
        let jog = jogging_stamina_reduction();
        assert_eq!(jog.period, Some(0.5));
        assert!(!jog.is_instant());

        let regen = stamina_regeneration();
        assert_eq!(regen.period, Some(0.35));
        assert_eq!(regen.modifiers[0].ignored_tags.len(), 4);
    }

    #[test]
    fn test_enemy_defaults_only_touch_health() {
        let def = default_attributes(
            AttributeProfile::Enemy,
            &CharacterDefaults::default(),
            &LevelingRules::default(),
            1,
        );
        assert_eq!(def.modifiers.len(), 1);
        assert_eq!(def.modifiers[0].attribute, Attribute::MaxHealth);
    }

    #[test]
    fn test_cooldown_grants_tag() {
        let def = cooldown(GameplayTag::from_static(names::COOLDOWN_SECONDARY_ATTACK), 1.0);
        assert!(matches!(def.duration, DurationPolicy::HasDuration(d) if d == 1.0));
        assert!(def.granted_tags.has(&GameplayTag::from_static("Cooldown")));
    }
}
