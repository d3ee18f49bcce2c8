//! Melee hit resolution

pub mod hit_resolver;
pub mod probe;

pub use hit_resolver::HitWindow;
pub use probe::{CapsuleBody, CapsuleOverlapProbe, CollisionCategory, PhysicsProbe, ProbeQuery};
