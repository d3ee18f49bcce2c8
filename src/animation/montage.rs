//! Montage assets and playback
//!
//! A montage is a fixed-length timeline carrying two kinds of notifies:
//! tag windows (begin/end tag events plus optional owner tag side effects)
//! and named one-shot notifies. Playback is advanced by the world tick and
//! reports notify edges in timeline order.

use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::abilities::AbilitySpecHandle;
use crate::core::config::ConfigError;
use crate::core::types::Seconds;
use crate::tags::{names, GameplayTag, TagContainer};

/// Window that raises a begin tag at `start` and an end tag at `end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagWindow {
    pub start: Seconds,
    pub end: Seconds,
    pub begin_tag: GameplayTag,
    pub end_tag: GameplayTag,
    /// Added to the owner at begin, removed at end
    #[serde(default)]
    pub add_tags: TagContainer,
    /// Removed from the owner at begin, restored at end
    #[serde(default)]
    pub remove_tags: TagContainer,
    /// Owner must have this tag or the window's begin is skipped
    #[serde(default)]
    pub required_tag: Option<GameplayTag>,
    #[serde(default)]
    pub magnitude: f32,
}

impl TagWindow {
    pub fn new(start: Seconds, end: Seconds, begin_tag: &'static str, end_tag: &'static str) -> Self {
        Self {
            start,
            end,
            begin_tag: GameplayTag::from_static(begin_tag),
            end_tag: GameplayTag::from_static(end_tag),
            add_tags: TagContainer::new(),
            remove_tags: TagContainer::new(),
            required_tag: None,
            magnitude: 0.0,
        }
    }

    pub fn adding(mut self, tags: TagContainer) -> Self {
        self.add_tags = tags;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MontageNotify {
    Window(TagWindow),
    Named { time: Seconds, name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MontageAsset {
    pub name: String,
    pub length: Seconds,
    /// Drives the pose's full-body flag while playing
    #[serde(default)]
    pub full_body: bool,
    #[serde(default, rename = "notify")]
    pub notifies: Vec<MontageNotify>,
}

impl MontageAsset {
    pub fn new(name: impl Into<String>, length: Seconds) -> Self {
        Self {
            name: name.into(),
            length,
            full_body: false,
            notifies: Vec::new(),
        }
    }

    pub fn with_window(mut self, window: TagWindow) -> Self {
        self.notifies.push(MontageNotify::Window(window));
        self
    }

    pub fn with_named(mut self, time: Seconds, name: impl Into<String>) -> Self {
        self.notifies.push(MontageNotify::Named {
            time,
            name: name.into(),
        });
        self
    }

    pub fn window(&self, index: usize) -> Option<&TagWindow> {
        match self.notifies.get(index) {
            Some(MontageNotify::Window(window)) => Some(window),
            _ => None,
        }
    }

    /// Begin and end tags of every window
    pub fn window_tags(&self) -> impl Iterator<Item = &GameplayTag> + '_ {
        self.notifies.iter().flat_map(|notify| match notify {
            MontageNotify::Window(w) => vec![&w.begin_tag, &w.end_tag],
            MontageNotify::Named { .. } => Vec::new(),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.length <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "montage {} has non-positive length",
                self.name
            )));
        }
        for notify in &self.notifies {
            if let MontageNotify::Window(w) = notify {
                if w.start < 0.0 || w.end <= w.start || w.end > self.length {
                    return Err(ConfigError::Invalid(format!(
                        "montage {}: window {} [{}, {}] is empty or outside [0, {}]",
                        self.name, w.begin_tag, w.start, w.end, self.length
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MontageEndReason {
    Completed,
    Interrupted,
    Cancelled,
}

/// Edge reported by playback, in timeline order
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    WindowBegin(usize),
    WindowEnd(usize),
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Ended(MontageEndReason),
}

/// One montage playing on one character
#[derive(Debug, Clone)]
pub struct MontagePlayback {
    pub asset: Arc<MontageAsset>,
    /// Ability that started the montage
    pub ability: AbilitySpecHandle,
    pub position: Seconds,
    pub play_rate: f32,
    state: PlaybackState,
    started: bool,
    open_windows: Vec<usize>,
    applied_windows: Vec<usize>,
}

impl MontagePlayback {
    pub fn new(asset: Arc<MontageAsset>, ability: AbilitySpecHandle) -> Self {
        Self {
            asset,
            ability,
            position: 0.0,
            play_rate: 1.0,
            state: PlaybackState::Playing,
            started: false,
            open_windows: Vec::new(),
            applied_windows: Vec::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_window_open(&self, index: usize) -> bool {
        self.open_windows.contains(&index)
    }

    /// Remember that a window's begin side effects were applied
    pub fn mark_applied(&mut self, index: usize) {
        if !self.applied_windows.contains(&index) {
            self.applied_windows.push(index);
        }
    }

    /// Forget a window's applied side effects, returning whether it had any
    pub fn take_applied(&mut self, index: usize) -> bool {
        let before = self.applied_windows.len();
        self.applied_windows.retain(|i| *i != index);
        before != self.applied_windows.len()
    }

    /// Advance the timeline, returning the edges crossed
    ///
    /// Reaching the end closes every open window and completes playback.
    pub fn advance(&mut self, dt: Seconds) -> Vec<TimelineEvent> {
        if !self.is_playing() {
            return Vec::new();
        }

        let from = self.position;
        let to = (self.position + dt * self.play_rate).min(self.asset.length);
        let inclusive_start = !self.started;
        self.started = true;
        self.position = to;

        let in_range = |t: Seconds| (t > from || (inclusive_start && t >= from)) && t <= to;

        // (time, order, event): ends sort before begins at the same instant
        let mut edges: Vec<(Seconds, u8, TimelineEvent)> = Vec::new();
        for (index, notify) in self.asset.notifies.iter().enumerate() {
            match notify {
                MontageNotify::Window(window) => {
                    if in_range(window.start) {
                        edges.push((window.start, 1, TimelineEvent::WindowBegin(index)));
                    }
                    if in_range(window.end) {
                        // A zero-length window closes right after it opens
                        let order = if window.end > window.start { 0 } else { 3 };
                        edges.push((window.end, order, TimelineEvent::WindowEnd(index)));
                    }
                }
                MontageNotify::Named { time, name } => {
                    if in_range(*time) {
                        edges.push((*time, 2, TimelineEvent::Named(name.clone())));
                    }
                }
            }
        }
        edges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut events = Vec::with_capacity(edges.len());
        for (_, _, event) in edges {
            match event {
                TimelineEvent::WindowBegin(index) => self.open_windows.push(index),
                TimelineEvent::WindowEnd(index) => {
                    // An end whose begin never fired is not reported
                    if !self.close_window(index) {
                        continue;
                    }
                }
                TimelineEvent::Named(_) => {}
            }
            events.push(event);
        }

        if to >= self.asset.length {
            events.extend(self.finish(MontageEndReason::Completed));
        }
        events
    }

    /// Stop playback early, closing open windows
    pub fn stop(&mut self, reason: MontageEndReason) -> Vec<TimelineEvent> {
        if !self.is_playing() {
            return Vec::new();
        }
        self.finish(reason)
    }

    fn close_window(&mut self, index: usize) -> bool {
        let before = self.open_windows.len();
        self.open_windows.retain(|i| *i != index);
        before != self.open_windows.len()
    }

    fn finish(&mut self, reason: MontageEndReason) -> Vec<TimelineEvent> {
        self.state = PlaybackState::Ended(reason);
        self.open_windows
            .drain(..)
            .map(TimelineEvent::WindowEnd)
            .collect()
    }
}

/// Something a character can play montages on
pub trait MontagePlayable {
    /// Start `asset` for `ability`, returning the ability whose montage was
    /// interrupted, if any
    fn play_montage(&mut self, asset: Arc<MontageAsset>, ability: AbilitySpecHandle) -> Option<AbilitySpecHandle>;

    /// Stop the current montage if `ability` owns it
    fn stop_montage(&mut self, ability: AbilitySpecHandle, reason: MontageEndReason) -> bool;

    fn current_montage(&self) -> Option<&MontagePlayback>;
}

#[derive(Debug, Deserialize)]
struct TomlMontages {
    #[serde(default)]
    montage: Vec<MontageAsset>,
}

/// Named montage assets
#[derive(Debug, Clone, Default)]
pub struct MontageLibrary {
    montages: AHashMap<String, Arc<MontageAsset>>,
}

pub const PRIMARY_STEP_MONTAGES: [&str; 4] = [
    "staff_primary_1",
    "staff_primary_2",
    "staff_primary_3",
    "staff_primary_4",
];
pub const SECONDARY_MONTAGE: &str = "staff_secondary";

impl MontageLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Staff combo montages used by the default player loadout
    pub fn with_defaults() -> Self {
        let mut library = Self::new();
        let attacking = TagContainer::from_static(&[names::STATE_ATTACKING]);

        let lengths = [1.0, 1.0, 1.1, 1.4];
        for (step, (name, length)) in PRIMARY_STEP_MONTAGES.iter().zip(lengths).enumerate() {
            let mut asset = MontageAsset::new(*name, length)
                .with_named(0.05, "swing_whoosh")
                .with_window(
                    TagWindow::new(0.25, 0.5, names::NOTIFY_DAMAGE_BEGIN, names::NOTIFY_DAMAGE_END)
                        .adding(attacking.clone()),
                );
            // Last step has nowhere to chain to
            if step + 1 < PRIMARY_STEP_MONTAGES.len() {
                asset = asset.with_window(TagWindow::new(
                    0.45,
                    0.8,
                    names::NOTIFY_COMBO_BEGIN,
                    names::NOTIFY_COMBO_END,
                ));
            }
            library.add(asset);
        }

        let mut secondary = MontageAsset::new(SECONDARY_MONTAGE, 1.6)
            .with_named(0.1, "staff_extend")
            .with_window(
                TagWindow::new(0.5, 0.9, names::NOTIFY_DAMAGE_BEGIN, names::NOTIFY_DAMAGE_END)
                    .adding(attacking),
            );
        secondary.full_body = true;
        library.add(secondary);

        library
    }

    pub fn add(&mut self, asset: MontageAsset) {
        self.montages.insert(asset.name.clone(), Arc::new(asset));
    }

    pub fn get(&self, name: &str) -> Option<Arc<MontageAsset>> {
        self.montages.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.montages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.montages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.montages.is_empty()
    }

    /// Merge montages from a TOML file over the current set
    pub fn load_from_toml(&mut self, path: &Path) -> Result<usize, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.extend_from_toml(&content)
    }

    /// Merge montages from a TOML string, returning how many were read
    pub fn extend_from_toml(&mut self, content: &str) -> Result<usize, ConfigError> {
        let data: TomlMontages = toml::from_str(content)?;
        let count = data.montage.len();
        for asset in data.montage {
            asset.validate()?;
            self.add(asset);
        }
        Ok(count)
    }

    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let mut library = Self::new();
        library.extend_from_toml(content)?;
        Ok(library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playback(asset: MontageAsset) -> MontagePlayback {
        MontagePlayback::new(Arc::new(asset), AbilitySpecHandle(0))
    }

    #[test]
    fn test_events_in_timeline_order() {
        let asset = MontageAsset::new("test", 1.0)
            .with_window(TagWindow::new(0.4, 0.6, names::NOTIFY_COMBO_BEGIN, names::NOTIFY_COMBO_END))
            .with_window(TagWindow::new(0.2, 0.5, names::NOTIFY_DAMAGE_BEGIN, names::NOTIFY_DAMAGE_END))
            .with_named(0.0, "start");
        let mut playback = playback(asset);

        let events = playback.advance(0.7);
        assert_eq!(
            events,
            vec![
                TimelineEvent::Named("start".into()),
                TimelineEvent::WindowBegin(1),
                TimelineEvent::WindowBegin(0),
                TimelineEvent::WindowEnd(1),
                TimelineEvent::WindowEnd(0),
            ]
        );
        assert!(playback.is_playing());
    }

    #[test]
    fn test_completion_closes_windows() {
        let asset = MontageAsset::new("test", 1.0)
            .with_window(TagWindow::new(0.5, 1.0, names::NOTIFY_DAMAGE_BEGIN, names::NOTIFY_DAMAGE_END));
        let mut playback = playback(asset);

        assert_eq!(playback.advance(0.6), vec![TimelineEvent::WindowBegin(0)]);
        assert!(playback.is_window_open(0));

        let events = playback.advance(0.6);
        assert_eq!(events, vec![TimelineEvent::WindowEnd(0)]);
        assert_eq!(playback.state(), PlaybackState::Ended(MontageEndReason::Completed));
        assert!(playback.advance(0.1).is_empty());
    }

    #[test]
    fn test_stop_closes_open_windows() {
        let asset = MontageAsset::new("test", 1.0)
            .with_window(TagWindow::new(0.1, 0.9, names::NOTIFY_DAMAGE_BEGIN, names::NOTIFY_DAMAGE_END));
        let mut playback = playback(asset);
        playback.advance(0.2);

        let events = playback.stop(MontageEndReason::Interrupted);
        assert_eq!(events, vec![TimelineEvent::WindowEnd(0)]);
        assert_eq!(playback.state(), PlaybackState::Ended(MontageEndReason::Interrupted));
        assert!(playback.stop(MontageEndReason::Cancelled).is_empty());
    }

    #[test]
    fn test_default_library() {
        let library = MontageLibrary::with_defaults();
        assert_eq!(library.len(), 5);

        let last = library.get(PRIMARY_STEP_MONTAGES[3]).unwrap();
        assert_eq!(last.window_tags().count(), 2);
        let first = library.get(PRIMARY_STEP_MONTAGES[0]).unwrap();
        assert_eq!(first.window_tags().count(), 4);
    }

    #[test]
    fn test_library_from_toml() {
        let library = MontageLibrary::parse_toml(
            r#"
            [[montage]]
            name = "kick"
            length = 0.8

            [[montage.notify]]
            kind = "window"
            start = 0.2
            end = 0.4
            begin_tag = "Combat.Notify.Damage.Begin"
            end_tag = "Combat.Notify.Damage.End"
            add_tags = ["Combat.State.Attacking"]

            [[montage.notify]]
            kind = "named"
            time = 0.1
            name = "grunt"
            "#,
        )
        .unwrap();

        let kick = library.get("kick").unwrap();
        assert_eq!(kick.notifies.len(), 2);
        assert_eq!(kick.window(0).unwrap().add_tags.len(), 1);
    }

    #[test]
    fn test_library_rejects_zero_length_window() {
        let result = MontageLibrary::parse_toml(
            r#"
            [[montage]]
            name = "instant"
            length = 1.0

            [[montage.notify]]
            kind = "window"
            start = 0.4
            end = 0.4
            begin_tag = "Combat.Notify.Combo.Begin"
            end_tag = "Combat.Notify.Combo.End"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_length_window_opens_and_closes() {
        let asset = MontageAsset::new("instant", 1.0).with_window(TagWindow::new(
            0.4,
            0.4,
            names::NOTIFY_COMBO_BEGIN,
            names::NOTIFY_COMBO_END,
        ));
        let mut playback = playback(asset);

        let events = playback.advance(0.5);
        assert_eq!(
            events,
            vec![TimelineEvent::WindowBegin(0), TimelineEvent::WindowEnd(0)]
        );
        assert!(!playback.is_window_open(0));
        assert!(playback.is_playing());
    }

    #[test]
    fn test_library_rejects_window_past_end() {
        let result = MontageLibrary::parse_toml(
            r#"
            [[montage]]
            name = "bad"
            length = 0.5

            [[montage.notify]]
            kind = "window"
            start = 0.2
            end = 0.9
            begin_tag = "Combat.Notify.Damage.Begin"
            end_tag = "Combat.Notify.Damage.End"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
