//! Ability definitions
//!
//! A definition is pure data: tag rules, cost, cooldown and the settings of
//! one behaviour kind. Granting a definition to a character produces an
//! [`AbilitySpec`](crate::abilities::AbilitySpec).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attributes::Attribute;
use crate::core::types::Seconds;
use crate::tags::{GameplayTag, TagContainer};

/// Name identifying an ability class, e.g. `PrimaryAttack.Step2`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityClass(String);

impl AbilityClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AbilityClass {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Position of an attack within a combo chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComboStep {
    #[default]
    None,
    Step1,
    Step2,
    Step3,
    Step4,
}

/// Attribute amount that must be available and is spent on commit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityCost {
    pub attribute: Attribute,
    pub amount: f32,
}

/// Tag granted for `duration` on commit; its presence blocks commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityCooldown {
    pub tag: GameplayTag,
    pub duration: Seconds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpSettings {
    pub sound: Option<String>,
    /// Signed stamina delta applied when the jump starts
    pub stamina_cost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintSettings {
    pub sprint_speed: f32,
    #[serde(default)]
    pub stamina_cost: Option<f32>,
    /// Apply the cost every period instead of once
    #[serde(default)]
    pub cost_period: Option<Seconds>,
    #[serde(default)]
    pub sound: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MontageSettings {
    pub montage: String,
    #[serde(default)]
    pub combo_step: ComboStep,
    #[serde(default)]
    pub next_combo: Option<AbilityClass>,
    #[serde(default)]
    pub stamina_cost: Option<f32>,
    pub trace_start_socket: String,
    pub trace_end_socket: String,
    /// Event sent to every actor the weapon touches
    pub damage_event_tag: GameplayTag,
    pub probe_radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceiveDamageSettings {
    pub base_damage: f32,
    pub can_crit: bool,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub knockback_force: f32,
    pub stun_duration: Seconds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AbilityKind {
    Jump(JumpSettings),
    Sprint(SprintSettings),
    Montage(MontageSettings),
    ReceiveDamage(ReceiveDamageSettings),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    pub class: AbilityClass,
    /// Tags describing the ability, matched by cancel and activate-by-tag
    #[serde(default)]
    pub asset_tags: TagContainer,
    /// Owned by the character while the ability is active
    #[serde(default)]
    pub activation_owned_tags: TagContainer,
    #[serde(default)]
    pub activation_required_tags: TagContainer,
    #[serde(default)]
    pub activation_blocked_tags: TagContainer,
    /// Active abilities with matching asset tags are cancelled on activation
    #[serde(default)]
    pub cancel_abilities_with_tags: TagContainer,
    /// Gameplay events that activate this ability
    #[serde(default)]
    pub triggers: TagContainer,
    #[serde(default)]
    pub cost: Option<AbilityCost>,
    #[serde(default)]
    pub cooldown: Option<AbilityCooldown>,
    pub kind: AbilityKind,
}

impl AbilityDefinition {
    pub fn new(class: impl Into<AbilityClass>, kind: AbilityKind) -> Self {
        Self {
            class: class.into(),
            asset_tags: TagContainer::new(),
            activation_owned_tags: TagContainer::new(),
            activation_required_tags: TagContainer::new(),
            activation_blocked_tags: TagContainer::new(),
            cancel_abilities_with_tags: TagContainer::new(),
            triggers: TagContainer::new(),
            cost: None,
            cooldown: None,
            kind,
        }
    }

    pub fn with_asset_tags(mut self, tags: TagContainer) -> Self {
        self.asset_tags = tags;
        self
    }

    pub fn with_owned_tags(mut self, tags: TagContainer) -> Self {
        self.activation_owned_tags = tags;
        self
    }

    pub fn with_required_tags(mut self, tags: TagContainer) -> Self {
        self.activation_required_tags = tags;
        self
    }

    pub fn with_blocked_tags(mut self, tags: TagContainer) -> Self {
        self.activation_blocked_tags = tags;
        self
    }

    pub fn cancelling(mut self, tags: TagContainer) -> Self {
        self.cancel_abilities_with_tags = tags;
        self
    }

    pub fn triggered_by(mut self, tags: TagContainer) -> Self {
        self.triggers = tags;
        self
    }

    pub fn with_cost(mut self, attribute: Attribute, amount: f32) -> Self {
        self.cost = Some(AbilityCost { attribute, amount });
        self
    }

    pub fn with_cooldown(mut self, tag: GameplayTag, duration: Seconds) -> Self {
        self.cooldown = Some(AbilityCooldown { tag, duration });
        self
    }

    pub fn montage_settings(&self) -> Option<&MontageSettings> {
        match &self.kind {
            AbilityKind::Montage(settings) => Some(settings),
            _ => None,
        }
    }
}
