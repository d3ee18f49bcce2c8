pub mod arena;
pub mod config;
pub mod error;
pub mod types;

pub use arena::Arena;
pub use config::{ConfigError, GameplayConfig};
pub use error::{GasError, Result};
pub use types::{ActorId, Rotator, Seconds};
