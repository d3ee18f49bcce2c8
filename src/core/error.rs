use thiserror::Error;

use crate::abilities::{AbilityClass, AbilitySpecHandle};
use crate::core::types::ActorId;

#[derive(Error, Debug)]
pub enum GasError {
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),

    #[error("Invalid ability handle: {0:?}")]
    InvalidAbilityHandle(AbilitySpecHandle),

    #[error("No ability granted for class: {0}")]
    AbilityNotGranted(AbilityClass),

    #[error("Ability already active: {0}")]
    AbilityAlreadyActive(AbilityClass),

    #[error("Activation blocked by tags for ability: {0}")]
    ActivationBlocked(AbilityClass),

    #[error("Commit failed for ability {class}: {reason}")]
    CommitFailed { class: AbilityClass, reason: String },

    #[error("Invalid gameplay tag: {0:?}")]
    InvalidTag(String),

    #[error("Montage not found: {0}")]
    MontageNotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GasError>;
