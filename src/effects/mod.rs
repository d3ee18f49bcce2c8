//! Gameplay effects
//!
//! An effect is a bundle of attribute modifiers plus a duration policy. Instant
//! effects execute once; periodic effects execute every period while they are
//! active. Each modifier re-checks its tag gate against the target at every
//! execution.

pub mod active;
pub mod catalog;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::attributes::{Attribute, AttributeSet, ModifierOutcome};
use crate::core::types::{ActorId, Seconds};
use crate::tags::{GameplayTag, TagContainer, TagState};

pub use active::{ActiveEffect, ActiveEffectHandle, ActiveEffects, EffectTick};

/// How a modifier combines with the current value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierOp {
    Additive,
    Override,
}

impl ModifierOp {
    pub fn apply(self, current: f32, magnitude: f32) -> f32 {
        match self {
            ModifierOp::Additive => current + magnitude,
            ModifierOp::Override => magnitude,
        }
    }
}

/// Where a modifier's magnitude comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Magnitude {
    Constant(f32),
    /// Supplied by the caller at apply time, keyed by tag
    SetByCaller(GameplayTag),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub attribute: Attribute,
    pub op: ModifierOp,
    pub magnitude: Magnitude,
    /// All of these must be owned by the target
    #[serde(default)]
    pub required_tags: TagContainer,
    /// None of these may be owned by the target
    #[serde(default)]
    pub ignored_tags: TagContainer,
}

impl Modifier {
    pub fn new(attribute: Attribute, op: ModifierOp, magnitude: Magnitude) -> Self {
        Self {
            attribute,
            op,
            magnitude,
            required_tags: TagContainer::new(),
            ignored_tags: TagContainer::new(),
        }
    }

    pub fn additive(attribute: Attribute, value: f32) -> Self {
        Self::new(attribute, ModifierOp::Additive, Magnitude::Constant(value))
    }

    pub fn with_required(mut self, tags: TagContainer) -> Self {
        self.required_tags = tags;
        self
    }

    pub fn with_ignored(mut self, tags: TagContainer) -> Self {
        self.ignored_tags = tags;
        self
    }

    /// Tag gate: `required ⊆ owned` and `ignored ∩ owned = ∅`
    pub fn passes(&self, tags: &TagState) -> bool {
        tags.has_all(&self.required_tags) && !tags.has_any(&self.ignored_tags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DurationPolicy {
    Instant,
    Infinite,
    HasDuration(Seconds),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDefinition {
    pub name: String,
    pub duration: DurationPolicy,
    /// Execution period for Infinite/HasDuration effects
    #[serde(default)]
    pub period: Option<Seconds>,
    #[serde(default = "default_true")]
    pub execute_period_on_application: bool,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Owned by the target while the effect is active
    #[serde(default)]
    pub granted_tags: TagContainer,
}

fn default_true() -> bool {
    true
}

impl EffectDefinition {
    pub fn instant(name: impl Into<String>, modifiers: Vec<Modifier>) -> Self {
        Self {
            name: name.into(),
            duration: DurationPolicy::Instant,
            period: None,
            execute_period_on_application: true,
            modifiers,
            granted_tags: TagContainer::new(),
        }
    }

    pub fn periodic(
        name: impl Into<String>,
        duration: DurationPolicy,
        period: Seconds,
        modifiers: Vec<Modifier>,
    ) -> Self {
        Self {
            name: name.into(),
            duration,
            period: Some(period),
            execute_period_on_application: true,
            modifiers,
            granted_tags: TagContainer::new(),
        }
    }

    /// Duration effect with no modifiers that only grants tags
    pub fn tag_grant(name: impl Into<String>, duration: Seconds, tags: TagContainer) -> Self {
        Self {
            name: name.into(),
            duration: DurationPolicy::HasDuration(duration),
            period: None,
            execute_period_on_application: true,
            modifiers: Vec::new(),
            granted_tags: tags,
        }
    }

    /// Instant with no period: executes once and never becomes active
    pub fn is_instant(&self) -> bool {
        matches!(self.duration, DurationPolicy::Instant) && self.period.is_none()
    }
}

/// An effect definition ready to apply
#[derive(Debug, Clone)]
pub struct EffectSpec {
    pub definition: EffectDefinition,
    pub level: u32,
    pub set_by_caller: AHashMap<GameplayTag, f32>,
    pub instigator: Option<ActorId>,
}

impl EffectSpec {
    pub fn new(definition: EffectDefinition) -> Self {
        Self {
            definition,
            level: 1,
            set_by_caller: AHashMap::new(),
            instigator: None,
        }
    }

    pub fn with_set_by_caller(mut self, tag: GameplayTag, value: f32) -> Self {
        self.set_by_caller.insert(tag, value);
        self
    }

    pub fn with_instigator(mut self, instigator: ActorId) -> Self {
        self.instigator = Some(instigator);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Resolve a modifier's magnitude; a missing set-by-caller value is zero
    pub fn magnitude_of(&self, modifier: &Modifier) -> f32 {
        match &modifier.magnitude {
            Magnitude::Constant(value) => *value,
            Magnitude::SetByCaller(tag) => match self.set_by_caller.get(tag) {
                Some(value) => *value,
                None => {
                    tracing::warn!(
                        "Effect {} has no set-by-caller magnitude for {}, using 0",
                        self.definition.name,
                        tag
                    );
                    0.0
                }
            },
        }
    }
}

/// Execute every modifier of `spec` whose tag gate passes
pub fn execute(spec: &EffectSpec, attributes: &mut AttributeSet, tags: &TagState) -> Vec<ModifierOutcome> {
    spec.definition
        .modifiers
        .iter()
        .filter(|modifier| modifier.passes(tags))
        .map(|modifier| {
            let magnitude = spec.magnitude_of(modifier);
            attributes.execute_modifier(modifier.attribute, modifier.op, magnitude, spec.instigator)
        })
        .collect()
}
