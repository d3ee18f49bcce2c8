//! Granted ability specs and their lifecycle state

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::abilities::{AbilityDefinition, AbilityInstance};

/// Handle of a granted ability, valid for the owner's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbilitySpecHandle(pub u32);

impl fmt::Display for AbilitySpecHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndAbilityFlags {
    pub replicate: bool,
    pub cancelled: bool,
}

impl EndAbilityFlags {
    pub const fn new(replicate: bool, cancelled: bool) -> Self {
        Self {
            replicate,
            cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityState {
    #[default]
    Inactive,
    Committing,
    Active,
    Ended { replicate: bool, cancelled: bool },
}

impl AbilityState {
    pub fn ended(flags: EndAbilityFlags) -> Self {
        AbilityState::Ended {
            replicate: flags.replicate,
            cancelled: flags.cancelled,
        }
    }

    /// Committing or Active
    pub fn is_active(self) -> bool {
        matches!(self, AbilityState::Committing | AbilityState::Active)
    }
}

#[derive(Debug)]
pub struct AbilitySpec {
    pub handle: AbilitySpecHandle,
    pub definition: AbilityDefinition,
    pub level: u32,
    pub state: AbilityState,
    pub instance: AbilityInstance,
    pub activation_count: u32,
}

impl AbilitySpec {
    pub fn new(handle: AbilitySpecHandle, definition: AbilityDefinition) -> Self {
        let instance = AbilityInstance::from_kind(&definition.kind);
        Self {
            handle,
            definition,
            level: 1,
            state: AbilityState::Inactive,
            instance,
            activation_count: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_activity() {
        assert!(!AbilityState::Inactive.is_active());
        assert!(AbilityState::Committing.is_active());
        assert!(AbilityState::Active.is_active());
        assert_eq!(
            AbilityState::ended(EndAbilityFlags::new(true, false)),
            AbilityState::Ended {
                replicate: true,
                cancelled: false
            }
        );
    }
}
