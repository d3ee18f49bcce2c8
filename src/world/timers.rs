//! Actor-owned timers
//!
//! Handles are never reused, so a handle kept after its timer was cancelled
//! or finished simply stops resolving.

use serde::{Deserialize, Serialize};

use crate::abilities::AbilitySpecHandle;
use crate::core::types::{ActorId, Seconds};
use crate::tags::GameplayTag;

/// Upper bound on firings of one repeating timer in a single tick
pub const MAX_FIRINGS_PER_TICK: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

/// Work the world performs when a timer fires
#[derive(Debug, Clone, PartialEq)]
pub enum TimerPayload {
    /// Sweep the weapon between two sockets of the owner
    HitProbe {
        ability: AbilitySpecHandle,
        start_socket: String,
        end_socket: String,
        radius: f32,
        event_tag: GameplayTag,
    },
    /// Push the owner's attributes to the HUD
    HudRefresh,
}

#[derive(Debug, Clone)]
struct Timer {
    handle: TimerHandle,
    owner: ActorId,
    interval: Seconds,
    remaining: Seconds,
    repeating: bool,
    payload: TimerPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FiredTimer {
    pub handle: TimerHandle,
    pub owner: ActorId,
    pub payload: TimerPayload,
}

#[derive(Debug, Default)]
pub struct TimerManager {
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a timer firing after `interval`, and every `interval` after
    /// that when `repeating`
    pub fn start(
        &mut self,
        owner: ActorId,
        interval: Seconds,
        repeating: bool,
        payload: TimerPayload,
    ) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            owner,
            interval: interval.max(f32::EPSILON),
            remaining: interval,
            repeating,
            payload,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        before != self.timers.len()
    }

    /// Cancel every timer owned by `owner`
    pub fn cancel_owned_by(&mut self, owner: ActorId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.owner != owner);
        before - self.timers.len()
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance all timers; a repeating timer fires once per elapsed interval
    pub fn tick(&mut self, dt: Seconds) -> Vec<FiredTimer> {
        let mut fired = Vec::new();

        for timer in &mut self.timers {
            timer.remaining -= dt;
            if timer.remaining > 0.0 {
                continue;
            }

            let count = if timer.repeating {
                let overdue = -timer.remaining;
                let elapsed = (overdue / timer.interval).floor();
                timer.remaining = timer.interval - (overdue - elapsed * timer.interval).clamp(0.0, timer.interval);
                if timer.remaining <= 0.0 {
                    timer.remaining = timer.interval;
                }
                (elapsed as usize).saturating_add(1).min(MAX_FIRINGS_PER_TICK)
            } else {
                1
            };

            for _ in 0..count {
                fired.push(FiredTimer {
                    handle: timer.handle,
                    owner: timer.owner,
                    payload: timer.payload.clone(),
                });
            }
        }

        self.timers.retain(|t| t.repeating || t.remaining > 0.0);
        fired
    }
}
