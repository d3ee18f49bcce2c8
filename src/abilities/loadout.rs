//! Default ability loadouts per character kind

use crate::abilities::{
    AbilityClass, AbilityDefinition, AbilityKind, ComboStep, JumpSettings, MontageSettings,
    ReceiveDamageSettings, SprintSettings,
};
use crate::animation::montage::{PRIMARY_STEP_MONTAGES, SECONDARY_MONTAGE};
use crate::core::config::GameplayConfig;
use crate::tags::{names, GameplayTag, TagContainer};

pub const JUMP: &str = "Jump";
pub const SPRINT: &str = "Sprint";
pub const PRIMARY_STEPS: [&str; 4] = [
    "PrimaryAttack.Step1",
    "PrimaryAttack.Step2",
    "PrimaryAttack.Step3",
    "PrimaryAttack.Step4",
];
pub const SECONDARY_ATTACK: &str = "SecondaryAttack";
pub const RECEIVE_STAFF_DAMAGE: &str = "ReceiveStaffMeleeDamage";

pub const STAFF_START_SOCKET: &str = "staff_start";
pub const STAFF_END_SOCKET: &str = "staff_end";
pub const STAFF_EXTENDED_SOCKET: &str = "staff_end_extended";

/// Cooldown of the secondary attack in seconds
const SECONDARY_COOLDOWN: f32 = 1.0;

fn alive_only() -> TagContainer {
    TagContainer::from_static(&[names::STATE_ALIVE])
}

pub fn jump(config: &GameplayConfig) -> AbilityDefinition {
    AbilityDefinition::new(
        JUMP,
        AbilityKind::Jump(JumpSettings {
            sound: Some("jump_grunt".into()),
            stamina_cost: Some(config.stamina_costs.jump),
        }),
    )
    .with_asset_tags(TagContainer::from_static(&[names::ABILITY_JUMP]))
    .with_required_tags(alive_only())
    .with_blocked_tags(TagContainer::from_static(&[names::STATE_DEAD, names::STATE_IN_ATTACK]))
}

pub fn sprint(config: &GameplayConfig) -> AbilityDefinition {
    AbilityDefinition::new(
        SPRINT,
        AbilityKind::Sprint(SprintSettings {
            sprint_speed: config.movement.sprint_speed,
            stamina_cost: Some(config.stamina_costs.sprint),
            cost_period: None,
            sound: None,
        }),
    )
    .with_asset_tags(TagContainer::from_static(&[names::ABILITY_SPRINT]))
    .with_required_tags(alive_only())
    .with_blocked_tags(TagContainer::from_static(&[names::STATE_DEAD]))
}

fn attack(
    class: &str,
    asset_tag: &'static str,
    settings: MontageSettings,
) -> AbilityDefinition {
    AbilityDefinition::new(class, AbilityKind::Montage(settings))
        .with_asset_tags(TagContainer::from_static(&[asset_tag]))
        .with_owned_tags(TagContainer::from_static(&[names::STATE_IN_ATTACK]))
        .with_required_tags(alive_only())
        .with_blocked_tags(TagContainer::from_static(&[names::STATE_DEAD, names::STATE_IN_ATTACK]))
        .cancelling(TagContainer::from_static(&[names::ABILITY_SPRINT]))
}

/// Four chained primary attacks, Step1 through Step4
pub fn primary_combo(config: &GameplayConfig) -> Vec<AbilityDefinition> {
    let steps = [ComboStep::Step1, ComboStep::Step2, ComboStep::Step3, ComboStep::Step4];

    (0..PRIMARY_STEPS.len())
        .map(|i| {
            let settings = MontageSettings {
                montage: PRIMARY_STEP_MONTAGES[i].to_string(),
                combo_step: steps[i],
                next_combo: PRIMARY_STEPS.get(i + 1).map(|next| AbilityClass::new(*next)),
                stamina_cost: Some(config.stamina_costs.primary_attack),
                trace_start_socket: STAFF_START_SOCKET.into(),
                trace_end_socket: STAFF_END_SOCKET.into(),
                damage_event_tag: GameplayTag::from_static(names::DAMAGE_MELEE_STAFF),
                probe_radius: config.combat.probe_radius,
            };
            attack(PRIMARY_STEPS[i], names::ABILITY_PRIMARY_ATTACK, settings)
        })
        .collect()
}

/// Long-reach attack traced to the extended staff tip
pub fn secondary_attack(config: &GameplayConfig) -> AbilityDefinition {
    let settings = MontageSettings {
        montage: SECONDARY_MONTAGE.to_string(),
        combo_step: ComboStep::None,
        next_combo: None,
        stamina_cost: Some(config.stamina_costs.secondary_attack),
        trace_start_socket: STAFF_START_SOCKET.into(),
        trace_end_socket: STAFF_EXTENDED_SOCKET.into(),
        damage_event_tag: GameplayTag::from_static(names::DAMAGE_MELEE_STAFF),
        probe_radius: config.combat.probe_radius,
    };
    attack(SECONDARY_ATTACK, names::ABILITY_SECONDARY_ATTACK, settings).with_cooldown(
        GameplayTag::from_static(names::COOLDOWN_SECONDARY_ATTACK),
        SECONDARY_COOLDOWN,
    )
}

pub fn receive_staff_damage(config: &GameplayConfig) -> AbilityDefinition {
    AbilityDefinition::new(
        RECEIVE_STAFF_DAMAGE,
        AbilityKind::ReceiveDamage(ReceiveDamageSettings {
            base_damage: config.combat.base_damage,
            can_crit: true,
            crit_chance: config.combat.crit_chance,
            crit_multiplier: config.combat.crit_multiplier,
            knockback_force: config.combat.knockback_force,
            stun_duration: config.combat.stun_duration,
        }),
    )
    .with_required_tags(alive_only())
    .triggered_by(TagContainer::from_static(&[names::DAMAGE_MELEE_STAFF]))
}

pub fn player(config: &GameplayConfig) -> Vec<AbilityDefinition> {
    let mut loadout = vec![jump(config), sprint(config)];
    loadout.extend(primary_combo(config));
    loadout.push(secondary_attack(config));
    loadout
}

pub fn enemy(config: &GameplayConfig) -> Vec<AbilityDefinition> {
    vec![receive_staff_damage(config)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_combo_chain() {
        let combo = primary_combo(&GameplayConfig::default());
        assert_eq!(combo.len(), 4);

        let next: Vec<Option<String>> = combo
            .iter()
            .map(|d| {
                d.montage_settings()
                    .and_then(|m| m.next_combo.as_ref())
                    .map(|c| c.to_string())
            })
            .collect();
        assert_eq!(
            next,
            vec![
                Some("PrimaryAttack.Step2".to_string()),
                Some("PrimaryAttack.Step3".to_string()),
                Some("PrimaryAttack.Step4".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_secondary_uses_extended_socket() {
        let def = secondary_attack(&GameplayConfig::default());
        let settings = def.montage_settings().unwrap();
        assert_eq!(settings.trace_end_socket, STAFF_EXTENDED_SOCKET);
        assert!(def.cooldown.is_some());
    }

    #[test]
    fn test_loadout_sizes() {
        let config = GameplayConfig::default();
        assert_eq!(player(&config).len(), 7);
        assert_eq!(enemy(&config).len(), 1);
    }
}
