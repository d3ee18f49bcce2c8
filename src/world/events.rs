//! World event log

use serde::{Deserialize, Serialize};

use crate::character::CharacterEvent;
use crate::core::types::{ActorId, Seconds};

/// A character event stamped with world time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u32,
    pub time: Seconds,
    pub actor: ActorId,
    pub event: CharacterEvent,
}

/// Append-only log of everything characters reported
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LogEntry>,
    next_id: u32,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time: Seconds, actor: ActorId, event: CharacterEvent) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(LogEntry {
            id,
            time,
            actor,
            event,
        });
        id
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries for one actor
    pub fn for_actor(&self, actor: ActorId) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter().filter(move |e| e.actor == actor)
    }

    /// Entries after a given time
    pub fn since(&self, time: Seconds) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter().filter(move |e| e.time > time)
    }

    pub fn count_matching(&self, predicate: impl Fn(&CharacterEvent) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.event)).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
