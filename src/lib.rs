//! Ability Forge - gameplay ability core
//!
//! Tagged characters with attributes, timed and periodic effects, abilities
//! driven by montage timelines (including a four-step staff combo) and a
//! melee hit resolver, all advanced by a single-threaded world tick.

pub mod abilities;
pub mod animation;
pub mod attributes;
pub mod character;
pub mod combat;
pub mod core;
pub mod effects;
pub mod tags;
pub mod world;
