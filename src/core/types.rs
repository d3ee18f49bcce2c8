//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};

/// Simulation time in seconds
pub type Seconds = f32;

/// Tolerance used for "nearly equal" float comparisons on attribute values
pub const NEARLY_EQUAL_TOLERANCE: f32 = 1.0e-4;

/// Compare two floats within [`NEARLY_EQUAL_TOLERANCE`]
pub fn nearly_equal(a: f32, b: f32) -> bool {
    (a - b).abs() <= NEARLY_EQUAL_TOLERANCE
}

/// Generation-checked handle to an actor slot in the world arena
///
/// A despawned actor's slot is reused with a bumped generation, so a stale id
/// never resolves to the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId {
    pub index: u32,
    pub generation: u32,
}

impl ActorId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Pitch/yaw/roll in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotator {
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Wrap an angle into (-180, 180]
    pub fn normalize_axis(angle: f32) -> f32 {
        let mut a = angle % 360.0;
        if a > 180.0 {
            a -= 360.0;
        } else if a <= -180.0 {
            a += 360.0;
        }
        a
    }

    /// Component-wise `self - other`, each axis normalized
    pub fn normalized_delta(self, other: Rotator) -> Rotator {
        Rotator {
            pitch: Self::normalize_axis(self.pitch - other.pitch),
            yaw: Self::normalize_axis(self.yaw - other.yaw),
            roll: Self::normalize_axis(self.roll - other.roll),
        }
    }

    /// Forward unit vector in the XY plane for this yaw
    pub fn forward_xy(self) -> glam::Vec3 {
        let yaw = self.yaw.to_radians();
        glam::Vec3::new(yaw.cos(), yaw.sin(), 0.0)
    }

    /// Right unit vector in the XY plane for this yaw
    pub fn right_xy(self) -> glam::Vec3 {
        let yaw = self.yaw.to_radians();
        glam::Vec3::new(-yaw.sin(), yaw.cos(), 0.0)
    }
}

/// Frame-rate independent interpolation towards `target`
///
/// Speed of zero snaps straight to the target.
pub fn interp_to(current: f32, target: f32, delta_time: Seconds, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }
    let dist = target - current;
    if dist * dist < 1.0e-8 {
        return target;
    }
    let step = (delta_time * speed).clamp(0.0, 1.0);
    current + dist * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_equality() {
        assert_eq!(ActorId::new(1, 0), ActorId::new(1, 0));
        assert_ne!(ActorId::new(1, 0), ActorId::new(1, 1));
    }

    #[test]
    fn test_normalize_axis_wraps() {
        assert_eq!(Rotator::normalize_axis(190.0), -170.0);
        assert_eq!(Rotator::normalize_axis(-190.0), 170.0);
        assert_eq!(Rotator::normalize_axis(180.0), 180.0);
    }

    #[test]
    fn test_normalized_delta_takes_short_way() {
        let aim = Rotator::new(0.0, 170.0, 0.0);
        let actor = Rotator::new(0.0, -170.0, 0.0);
        let delta = aim.normalized_delta(actor);
        assert!((delta.yaw - (-20.0)).abs() < 0.001);
    }

    #[test]
    fn test_interp_to() {
        assert_eq!(interp_to(0.0, 10.0, 0.1, 0.0), 10.0);
        let v = interp_to(0.0, 10.0, 0.1, 6.0);
        assert!((v - 6.0).abs() < 0.001);
        // Step is clamped so it never overshoots
        assert_eq!(interp_to(0.0, 10.0, 1.0, 6.0), 10.0);
    }

    #[test]
    fn test_nearly_equal() {
        assert!(nearly_equal(1.0, 1.00005));
        assert!(!nearly_equal(1.0, 1.001));
    }
}
