//! Per-actor loose tag state
//!
//! Reference counted: two independent callers adding the same tag keep it
//! present until both have removed it.

use ahash::AHashMap;

use crate::tags::{GameplayTag, TagContainer};

#[derive(Debug, Clone, Default)]
pub struct TagState {
    counts: AHashMap<GameplayTag, u32>,
}

impl TagState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one reference to `tag`
    pub fn add(&mut self, tag: GameplayTag) {
        *self.counts.entry(tag).or_insert(0) += 1;
    }

    pub fn add_all(&mut self, tags: &TagContainer) {
        for tag in tags.iter() {
            self.add(tag.clone());
        }
    }

    /// Drop one reference to `tag`; removing an absent tag does nothing
    pub fn remove(&mut self, tag: &GameplayTag) {
        match self.counts.get_mut(tag) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                self.counts.remove(tag);
            }
            None => tracing::debug!("Removing tag {} that is not present", tag),
        }
    }

    pub fn remove_all(&mut self, tags: &TagContainer) {
        for tag in tags.iter() {
            self.remove(tag);
        }
    }

    /// Hierarchical presence check
    pub fn has(&self, query: &GameplayTag) -> bool {
        self.counts.keys().any(|owned| owned.matches(query))
    }

    pub fn has_exact(&self, tag: &GameplayTag) -> bool {
        self.counts.contains_key(tag)
    }

    /// Vacuously true for an empty query
    pub fn has_all(&self, queries: &TagContainer) -> bool {
        queries.iter().all(|q| self.has(q))
    }

    pub fn has_any(&self, queries: &TagContainer) -> bool {
        queries.iter().any(|q| self.has(q))
    }

    /// Current reference count of an exact tag
    pub fn count(&self, tag: &GameplayTag) -> u32 {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    /// Unique owned tags, sorted for stable output
    pub fn snapshot(&self) -> TagContainer {
        let mut tags: Vec<GameplayTag> = self.counts.keys().cloned().collect();
        tags.sort();
        tags.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &'static str) -> GameplayTag {
        GameplayTag::from_static(name)
    }

    #[test]
    fn test_reference_counting() {
        let mut state = TagState::new();
        state.add(tag("Character.Movement.Jogging"));
        state.add(tag("Character.Movement.Jogging"));
        assert_eq!(state.count(&tag("Character.Movement.Jogging")), 2);

        state.remove(&tag("Character.Movement.Jogging"));
        assert!(state.has(&tag("Character.Movement.Jogging")));

        state.remove(&tag("Character.Movement.Jogging"));
        assert!(!state.has(&tag("Character.Movement.Jogging")));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut state = TagState::new();
        state.remove(&tag("Combat"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_hierarchical_queries() {
        let mut state = TagState::new();
        state.add(tag("Combat.State.Attacking"));
        state.add(tag("Character.State.Alive"));

        assert!(state.has(&tag("Combat")));
        assert!(!state.has_exact(&tag("Combat")));
        assert!(state.has_all(&TagContainer::from_static(&["Combat", "Character.State.Alive"])));
        assert!(state.has_any(&TagContainer::from_static(&["Character.Movement", "Combat"])));
        assert!(!state.has_any(&TagContainer::from_static(&["Character.Movement"])));
    }

    #[test]
    fn test_snapshot_is_sorted_and_unique() {
        let mut state = TagState::new();
        state.add(tag("Combat"));
        state.add(tag("Character.State.Alive"));
        state.add(tag("Combat"));

        let snapshot = state.snapshot();
        let names: Vec<&str> = snapshot.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, vec!["Character.State.Alive", "Combat"]);
    }
}
