//! Character attributes
//!
//! Numeric stats with an optional paired maximum. The store clamps base
//! attributes to `[0, max]` after every effect execution and reports each
//! change so the owning character can forward it to the HUD and event log.

pub mod set;

use serde::{Deserialize, Serialize};

use crate::core::types::ActorId;

pub use set::{AttributeSet, ModifierOutcome};

/// Every attribute known to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Health,
    MaxHealth,
    Stamina,
    MaxStamina,
    Adrenaline,
    MaxAdrenaline,
    ExperiencePoints,
    MaxExperiencePoints,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::Health,
        Attribute::MaxHealth,
        Attribute::Stamina,
        Attribute::MaxStamina,
        Attribute::Adrenaline,
        Attribute::MaxAdrenaline,
        Attribute::ExperiencePoints,
        Attribute::MaxExperiencePoints,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Paired max attribute of a base attribute
    pub fn max_attribute(self) -> Option<Attribute> {
        match self {
            Attribute::Health => Some(Attribute::MaxHealth),
            Attribute::Stamina => Some(Attribute::MaxStamina),
            Attribute::Adrenaline => Some(Attribute::MaxAdrenaline),
            Attribute::ExperiencePoints => Some(Attribute::MaxExperiencePoints),
            _ => None,
        }
    }

    /// Paired base attribute of a max attribute
    pub fn base_attribute(self) -> Option<Attribute> {
        match self {
            Attribute::MaxHealth => Some(Attribute::Health),
            Attribute::MaxStamina => Some(Attribute::Stamina),
            Attribute::MaxAdrenaline => Some(Attribute::Adrenaline),
            Attribute::MaxExperiencePoints => Some(Attribute::ExperiencePoints),
            _ => None,
        }
    }

    pub fn is_max(self) -> bool {
        self.base_attribute().is_some()
    }
}

/// Which attributes a character carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeProfile {
    /// Health, stamina, adrenaline and experience
    Player,
    /// Health only
    Enemy,
}

impl AttributeProfile {
    pub fn supports(self, attribute: Attribute) -> bool {
        match self {
            AttributeProfile::Player => true,
            AttributeProfile::Enemy => {
                matches!(attribute, Attribute::Health | Attribute::MaxHealth)
            }
        }
    }
}

/// Notification raised after an attribute was changed by an effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub attribute: Attribute,
    /// Signed additive magnitude (zero for overrides)
    pub delta: f32,
    pub new_value: f32,
    pub max_value: f32,
    pub instigator: Option<ActorId>,
}

/// Read access to an actor's attributes
pub trait HasAttributes {
    fn attributes(&self) -> &AttributeSet;

    fn attribute(&self, attribute: Attribute) -> f32 {
        self.attributes().get(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_are_symmetric() {
        for attribute in Attribute::ALL {
            if let Some(max) = attribute.max_attribute() {
                assert_eq!(max.base_attribute(), Some(attribute));
            }
        }
    }

    #[test]
    fn test_enemy_profile_only_has_health() {
        assert!(AttributeProfile::Enemy.supports(Attribute::Health));
        assert!(AttributeProfile::Enemy.supports(Attribute::MaxHealth));
        assert!(!AttributeProfile::Enemy.supports(Attribute::Stamina));
        assert!(AttributeProfile::Player.supports(Attribute::ExperiencePoints));
    }
}
