//! Per-character animation pose variables
//!
//! Reads a character without mutating it and produces the values a blend
//! graph would consume.

use serde::{Deserialize, Serialize};

use crate::animation::MontagePlayable;
use crate::character::Character;
use crate::core::config::MovementConfig;
use crate::core::types::{interp_to, Rotator, Seconds};

const LEAN_INTENSITY: f32 = 7.0;
const LEAN_INTERP_SPEED: f32 = 6.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimPose {
    pub in_air: bool,
    pub speed: f32,
    /// Aim rotation relative to the actor rotation
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    /// Smoothed lean amount
    pub yaw_delta: f32,
    pub accelerating: bool,
    /// A full-body montage is playing
    pub full_body: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AnimInstance {
    pose: AnimPose,
    rotation_last_tick: Option<Rotator>,
}

impl AnimInstance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pose(&self) -> &AnimPose {
        &self.pose
    }

    pub fn update(&mut self, character: &Character, dt: Seconds, movement_config: &MovementConfig) -> &AnimPose {
        let movement = &character.state.movement;
        let actor_rotation = movement.rotation;

        self.pose.in_air = movement.is_falling;
        self.pose.speed = movement.speed();

        let aim = movement.control_rotation.normalized_delta(actor_rotation);
        self.pose.roll = aim.roll;
        self.pose.pitch = aim.pitch;
        self.pose.yaw = aim.yaw;

        let target = aim.yaw / LEAN_INTENSITY;
        self.pose.yaw_delta = interp_to(self.pose.yaw_delta, target, dt, LEAN_INTERP_SPEED);
        if let Some(last) = self.rotation_last_tick {
            let turned = last.normalized_delta(actor_rotation).yaw;
            tracing::trace!("{} turned {:.2} degrees since last pose update", character.id(), turned);
        }
        self.rotation_last_tick = Some(actor_rotation);

        self.pose.accelerating = movement.acceleration.length() > movement_config.accelerating_threshold;
        self.pose.full_body = character
            .state
            .current_montage()
            .is_some_and(|playback| playback.is_playing() && playback.asset.full_body);

        &self.pose
    }
}
