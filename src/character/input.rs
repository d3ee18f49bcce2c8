//! Input bindings for player characters

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::core::types::Rotator;
use crate::tags::{names, GameplayTag, TagContainer};
use crate::world::WorldServices;

/// Control pitch is kept inside this range (degrees)
const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    Move,
    Look,
    Jump,
    Sprint,
    PrimaryAttack,
    SecondaryAttack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerEvent {
    Started,
    Triggered,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum InputValue {
    #[default]
    None,
    Axis2D(Vec2),
}

impl InputValue {
    pub fn axis(self) -> Vec2 {
        match self {
            InputValue::Axis2D(axis) => axis,
            InputValue::None => Vec2::ZERO,
        }
    }
}

impl Character {
    /// Route one input event; returns whether it did anything
    pub fn handle_input(
        &mut self,
        action: InputAction,
        trigger: TriggerEvent,
        value: InputValue,
        services: &mut WorldServices,
    ) -> bool {
        let state = &mut self.state;
        let abilities = &mut self.abilities;

        match (action, trigger) {
            (InputAction::Move, TriggerEvent::Started) => {
                state.tags.add(GameplayTag::from_static(names::MOVEMENT_JOGGING));
                true
            }
            (InputAction::Move, TriggerEvent::Completed | TriggerEvent::Canceled) => {
                state.tags.remove(&GameplayTag::from_static(names::MOVEMENT_JOGGING));
                true
            }
            (InputAction::Move, TriggerEvent::Triggered) => {
                let axis = value.axis();
                if axis == Vec2::ZERO {
                    return false;
                }
                // Forward/right relative to where the controller looks
                let yaw_only = Rotator::new(0.0, state.movement.control_rotation.yaw, 0.0);
                let direction: Vec3 = yaw_only.forward_xy() * axis.y + yaw_only.right_xy() * axis.x;
                state.movement.add_input(direction);
                true
            }
            (InputAction::Look, TriggerEvent::Triggered) => {
                let axis = value.axis();
                let control = &mut state.movement.control_rotation;
                control.yaw = Rotator::normalize_axis(control.yaw + axis.x);
                control.pitch = (control.pitch - axis.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
                true
            }
            (InputAction::Jump, TriggerEvent::Started) => abilities.try_activate_by_tag(
                &GameplayTag::from_static(names::ABILITY_JUMP),
                state,
                services,
            ),
            (InputAction::Jump, TriggerEvent::Completed | TriggerEvent::Canceled) => {
                abilities.input_released(&GameplayTag::from_static(names::ABILITY_JUMP), state, services) > 0
            }
            (InputAction::Sprint, TriggerEvent::Started) => abilities.try_activate_by_tag(
                &GameplayTag::from_static(names::ABILITY_SPRINT),
                state,
                services,
            ),
            (InputAction::Sprint, TriggerEvent::Completed | TriggerEvent::Canceled) => {
                let sprint = TagContainer::from_static(&[names::ABILITY_SPRINT]);
                abilities.cancel_abilities_with_tags(&sprint, state, services) > 0
            }
            (InputAction::PrimaryAttack, TriggerEvent::Started) => {
                if abilities.is_combo_window_open() {
                    abilities.combo_input(state, services)
                } else {
                    abilities.try_activate_by_tag(
                        &GameplayTag::from_static(names::ABILITY_PRIMARY_ATTACK),
                        state,
                        services,
                    )
                }
            }
            (InputAction::SecondaryAttack, TriggerEvent::Started) => abilities.try_activate_by_tag(
                &GameplayTag::from_static(names::ABILITY_SECONDARY_ATTACK),
                state,
                services,
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterKind;
    use crate::core::types::ActorId;
    use crate::core::GameplayConfig;
    use crate::tags::HasTags;

    fn setup() -> (Character, WorldServices) {
        let config = GameplayConfig::default();
        let character = Character::new(ActorId::new(0, 0), CharacterKind::Player, "Wukong", Vec3::ZERO, &config);
        (character, WorldServices::new(config))
    }

    #[test]
    fn test_move_toggles_jogging() {
        let (mut character, mut services) = setup();
        let jogging = GameplayTag::from_static(names::MOVEMENT_JOGGING);

        character.handle_input(InputAction::Move, TriggerEvent::Started, InputValue::None, &mut services);
        assert!(character.has_tag(&jogging));

        character.handle_input(InputAction::Move, TriggerEvent::Completed, InputValue::None, &mut services);
        assert!(!character.has_tag(&jogging));
    }

    #[test]
    fn test_move_follows_control_yaw() {
        let (mut character, mut services) = setup();
        character.state.movement.control_rotation.yaw = 90.0;

        character.handle_input(
            InputAction::Move,
            TriggerEvent::Triggered,
            InputValue::Axis2D(Vec2::new(0.0, 1.0)),
            &mut services,
        );
        character.state.movement.tick(0.1, 980.0);

        let position = character.state.movement.position;
        assert!(position.x.abs() < 1.0e-3);
        assert!(position.y > 0.0);
    }

    #[test]
    fn test_look_clamps_pitch() {
        let (mut character, mut services) = setup();
        character.handle_input(
            InputAction::Look,
            TriggerEvent::Triggered,
            InputValue::Axis2D(Vec2::new(10.0, -500.0)),
            &mut services,
        );

        let control = character.state.movement.control_rotation;
        assert_eq!(control.yaw, 10.0);
        assert_eq!(control.pitch, PITCH_LIMIT);
    }

    #[test]
    fn test_unbound_trigger_is_ignored() {
        let (mut character, mut services) = setup();
        assert!(!character.handle_input(
            InputAction::SecondaryAttack,
            TriggerEvent::Completed,
            InputValue::None,
            &mut services
        ));
    }
}
