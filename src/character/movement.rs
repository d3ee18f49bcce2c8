//! Minimal character movement: walking, jumping and falling on a flat floor

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{Rotator, Seconds};

/// Height of the floor every character stands on
pub const FLOOR_Z: f32 = 0.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Velocity change per second over the last step
    pub acceleration: Vec3,
    pub rotation: Rotator,
    /// Where the controller is looking
    pub control_rotation: Rotator,
    pub max_walk_speed: f32,
    pub is_falling: bool,
    /// Jump input held
    pub is_jumping: bool,
    pending_input: Vec3,
}

impl Movement {
    pub fn new(position: Vec3, max_walk_speed: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            rotation: Rotator::default(),
            control_rotation: Rotator::default(),
            max_walk_speed,
            is_falling: position.z > FLOOR_Z,
            is_jumping: false,
            pending_input: Vec3::ZERO,
        }
    }

    /// Queue a world-space movement direction for the next step
    pub fn add_input(&mut self, direction: Vec3) {
        self.pending_input += Vec3::new(direction.x, direction.y, 0.0);
    }

    pub fn jump(&mut self, jump_z_velocity: f32) -> bool {
        if self.is_falling {
            return false;
        }
        self.velocity.z = jump_z_velocity;
        self.is_falling = true;
        self.is_jumping = true;
        true
    }

    pub fn stop_jumping(&mut self) {
        self.is_jumping = false;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn ground_speed(&self) -> f32 {
        Vec3::new(self.velocity.x, self.velocity.y, 0.0).length()
    }

    /// Integrate one step; input is consumed
    pub fn tick(&mut self, dt: Seconds, gravity: f32) {
        if dt <= 0.0 {
            return;
        }

        let previous = self.velocity;
        let input = std::mem::take(&mut self.pending_input).clamp_length_max(1.0);
        let horizontal = input * self.max_walk_speed;
        self.velocity.x = horizontal.x;
        self.velocity.y = horizontal.y;

        if input.length_squared() > 0.0 {
            self.rotation.yaw = input.y.atan2(input.x).to_degrees();
        }

        if self.is_falling {
            self.velocity.z -= gravity * dt;
        }

        self.position += self.velocity * dt;

        if self.is_falling && self.position.z <= FLOOR_Z && self.velocity.z <= 0.0 {
            self.position.z = FLOOR_Z;
            self.velocity.z = 0.0;
            self.is_falling = false;
        }

        self.acceleration = (self.velocity - previous) / dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_at_max_speed() {
        let mut movement = Movement::new(Vec3::ZERO, 500.0);
        movement.add_input(Vec3::new(2.0, 0.0, 0.0));
        movement.tick(0.1, 980.0);

        assert!((movement.position.x - 50.0).abs() < 1.0e-3);
        assert_eq!(movement.ground_speed(), 500.0);
        assert!(movement.acceleration.length() > 0.0);

        // No input, no motion
        movement.tick(0.1, 980.0);
        assert_eq!(movement.ground_speed(), 0.0);
    }

    #[test]
    fn test_jump_and_land() {
        let mut movement = Movement::new(Vec3::ZERO, 500.0);
        assert!(movement.jump(420.0));
        assert!(!movement.jump(420.0));

        for _ in 0..120 {
            movement.tick(1.0 / 60.0, 980.0);
        }
        assert!(!movement.is_falling);
        assert_eq!(movement.position.z, FLOOR_Z);
    }
}
