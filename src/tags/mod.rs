//! Hierarchical gameplay tags
//!
//! A tag is a dot-segmented name such as `Character.Movement.Sprinting`.
//! Matching is hierarchical: a query for `Combat` matches an owned
//! `Combat.Notify.Damage`, but not the other way round.

pub mod names;
pub mod state;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{GasError, Result};

pub use state::TagState;

/// A single hierarchical tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameplayTag(String);

impl GameplayTag {
    /// Parse a tag, rejecting empty names and empty segments
    pub fn parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(GasError::InvalidTag(name));
        }
        Ok(Self(name))
    }

    /// Build a tag from a known-good static name
    pub fn from_static(name: &'static str) -> Self {
        debug_assert!(Self::parse(name).is_ok(), "invalid static tag {name:?}");
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if `self` equals `query` or is a descendant of it
    pub fn matches(&self, query: &GameplayTag) -> bool {
        self.0 == query.0
            || (self.0.len() > query.0.len()
                && self.0.starts_with(query.0.as_str())
                && self.0.as_bytes()[query.0.len()] == b'.')
    }

    /// Immediate parent (`A.B.C` -> `A.B`)
    pub fn parent(&self) -> Option<GameplayTag> {
        self.0.rfind('.').map(|i| GameplayTag(self.0[..i].to_string()))
    }
}

impl fmt::Display for GameplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GameplayTag {
    type Error = GasError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<GameplayTag> for String {
    fn from(tag: GameplayTag) -> Self {
        tag.0
    }
}

/// Small ordered set of unique tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagContainer {
    tags: Vec<GameplayTag>,
}

impl TagContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(tag: GameplayTag) -> Self {
        Self { tags: vec![tag] }
    }

    /// Build a container from static names
    pub fn from_static(names: &[&'static str]) -> Self {
        let mut container = Self::new();
        for name in names {
            container.insert(GameplayTag::from_static(name));
        }
        container
    }

    /// Insert, ignoring exact duplicates
    pub fn insert(&mut self, tag: GameplayTag) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn remove(&mut self, tag: &GameplayTag) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        before != self.tags.len()
    }

    pub fn contains_exact(&self, tag: &GameplayTag) -> bool {
        self.tags.contains(tag)
    }

    /// True if any contained tag matches `query` hierarchically
    pub fn has(&self, query: &GameplayTag) -> bool {
        self.tags.iter().any(|t| t.matches(query))
    }

    pub fn has_any(&self, queries: &TagContainer) -> bool {
        queries.iter().any(|q| self.has(q))
    }

    /// Vacuously true for an empty query
    pub fn has_all(&self, queries: &TagContainer) -> bool {
        queries.iter().all(|q| self.has(q))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameplayTag> + '_ {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<GameplayTag> for TagContainer {
    fn from_iter<I: IntoIterator<Item = GameplayTag>>(iter: I) -> Self {
        let mut container = Self::new();
        for tag in iter {
            container.insert(tag);
        }
        container
    }
}

/// Read access to an actor's owned tags
pub trait HasTags {
    fn tags(&self) -> &TagState;

    fn has_tag(&self, tag: &GameplayTag) -> bool {
        self.tags().has(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(GameplayTag::parse("Combat").is_ok());
        assert!(GameplayTag::parse("").is_err());
        assert!(GameplayTag::parse("Combat..Damage").is_err());
        assert!(GameplayTag::parse("Combat.").is_err());
    }

    #[test]
    fn test_hierarchical_match() {
        let owned = GameplayTag::from_static("Combat.Notify.Damage.Begin");
        assert!(owned.matches(&GameplayTag::from_static("Combat")));
        assert!(owned.matches(&GameplayTag::from_static("Combat.Notify")));
        assert!(owned.matches(&owned.clone()));
        assert!(!GameplayTag::from_static("Combat").matches(&owned));
        // Prefix that is not a segment boundary
        assert!(!GameplayTag::from_static("CombatStance").matches(&GameplayTag::from_static("Combat")));
    }

    #[test]
    fn test_parent() {
        let tag = GameplayTag::from_static("Character.Movement.Sprinting");
        assert_eq!(tag.parent().unwrap().as_str(), "Character.Movement");
        assert!(GameplayTag::from_static("Combat").parent().is_none());
    }

    #[test]
    fn test_container_dedups_and_queries() {
        let mut tags = TagContainer::from_static(&["Character.State.Alive", "Character.Type.Player"]);
        tags.insert(GameplayTag::from_static("Character.State.Alive"));
        assert_eq!(tags.len(), 2);

        assert!(tags.has(&GameplayTag::from_static("Character.State")));
        assert!(tags.has_all(&TagContainer::from_static(&["Character.State.Alive", "Character.Type"])));
        assert!(!tags.has_any(&TagContainer::from_static(&["Combat"])));
        assert!(tags.has_all(&TagContainer::new()));
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let tag: GameplayTag = serde_json::from_str("\"Combat.Damage\"").unwrap();
        assert_eq!(tag.as_str(), "Combat.Damage");
        assert!(serde_json::from_str::<GameplayTag>("\"Combat..Damage\"").is_err());
    }
}
