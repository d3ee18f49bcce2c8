//! Per-window hit bookkeeping
//!
//! While a damage window is open every probe reports the actors it touches;
//! only the first touch of each actor in a window counts as a hit.

use ahash::AHashSet;

use crate::core::types::ActorId;

#[derive(Debug, Clone, Default)]
pub struct HitWindow {
    open: bool,
    hit: AHashSet<ActorId>,
}

impl HitWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new window with an empty hit set
    pub fn open(&mut self) {
        self.hit.clear();
        self.open = true;
    }

    /// Discard the window
    pub fn close(&mut self) {
        self.hit.clear();
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Record a touched actor; true only for the first touch in this window
    pub fn record(&mut self, target: ActorId) -> bool {
        self.open && self.hit.insert(target)
    }

    pub fn has_hit(&self, target: ActorId) -> bool {
        self.hit.contains(&target)
    }

    pub fn hit_count(&self) -> usize {
        self.hit.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hit_per_window() {
        let target = ActorId::new(3, 0);
        let mut window = HitWindow::new();
        window.open();

        let hits = (0..10).filter(|_| window.record(target)).count();
        assert_eq!(hits, 1);

        window.close();
        window.open();
        assert!(window.record(target));
    }

    #[test]
    fn test_closed_window_records_nothing() {
        let mut window = HitWindow::new();
        assert!(!window.record(ActorId::new(1, 0)));
        assert_eq!(window.hit_count(), 0);
    }
}
