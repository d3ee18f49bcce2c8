//! HUD presentation boundary

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::attributes::{Attribute, AttributeSet};
use crate::core::types::ActorId;

/// Receives `(current, max)` pairs for the bars a HUD shows
pub trait HudSink {
    fn update_health(&mut self, actor: ActorId, current: f32, max: f32);
    fn update_stamina(&mut self, actor: ActorId, current: f32, max: f32);
    fn update_adrenaline(&mut self, actor: ActorId, current: f32, max: f32);
}

/// Route one attribute to the matching HUD bar; other attributes are ignored
pub fn push_attribute(sink: &mut dyn HudSink, actor: ActorId, attribute: Attribute, current: f32, max: f32) {
    match attribute {
        Attribute::Health => sink.update_health(actor, current, max),
        Attribute::Stamina => sink.update_stamina(actor, current, max),
        Attribute::Adrenaline => sink.update_adrenaline(actor, current, max),
        _ => {}
    }
}

/// Push every bar the attribute set supports
pub fn push_all(sink: &mut dyn HudSink, actor: ActorId, attributes: &AttributeSet) {
    for attribute in [Attribute::Health, Attribute::Stamina, Attribute::Adrenaline] {
        if let Some(max) = attributes.max_of(attribute).filter(|_| attributes.supports(attribute)) {
            push_attribute(sink, actor, attribute, attributes.get(attribute), max);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullHud;

impl HudSink for NullHud {
    fn update_health(&mut self, _actor: ActorId, _current: f32, _max: f32) {}
    fn update_stamina(&mut self, _actor: ActorId, _current: f32, _max: f32) {}
    fn update_adrenaline(&mut self, _actor: ActorId, _current: f32, _max: f32) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HudBar {
    Health,
    Stamina,
    Adrenaline,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudUpdate {
    pub actor: ActorId,
    pub bar: HudBar,
    pub current: f32,
    pub max: f32,
}

impl HudUpdate {
    pub fn percent(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }
}

/// Records every update; clones share one log
#[derive(Debug, Clone, Default)]
pub struct RecordingHud {
    updates: Rc<RefCell<Vec<HudUpdate>>>,
}

impl RecordingHud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<HudUpdate> {
        self.updates.borrow().clone()
    }

    /// Most recent update of one bar for one actor
    pub fn latest(&self, actor: ActorId, bar: HudBar) -> Option<HudUpdate> {
        self.updates
            .borrow()
            .iter()
            .rev()
            .find(|u| u.actor == actor && u.bar == bar)
            .copied()
    }

    fn record(&mut self, actor: ActorId, bar: HudBar, current: f32, max: f32) {
        self.updates.borrow_mut().push(HudUpdate {
            actor,
            bar,
            current,
            max,
        });
    }
}

impl HudSink for RecordingHud {
    fn update_health(&mut self, actor: ActorId, current: f32, max: f32) {
        self.record(actor, HudBar::Health, current, max);
    }

    fn update_stamina(&mut self, actor: ActorId, current: f32, max: f32) {
        tracing::trace!("Setting stamina bar percent for {}: {}", actor, current / max.max(f32::EPSILON));
        self.record(actor, HudBar::Stamina, current, max);
    }

    fn update_adrenaline(&mut self, actor: ActorId, current: f32, max: f32) {
        self.record(actor, HudBar::Adrenaline, current, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeProfile;

    #[test]
    fn test_recording_hud_shares_log() {
        let hud = RecordingHud::new();
        let mut sink = hud.clone();
        let actor = ActorId::new(0, 0);

        sink.update_health(actor, 50.0, 100.0);
        sink.update_health(actor, 40.0, 100.0);

        assert_eq!(hud.updates().len(), 2);
        let latest = hud.latest(actor, HudBar::Health).unwrap();
        assert_eq!(latest.current, 40.0);
        assert!((latest.percent() - 0.4).abs() < 1.0e-6);
    }

    #[test]
    fn test_push_all_skips_unsupported() {
        let mut attributes = AttributeSet::new(AttributeProfile::Enemy);
        attributes.set(Attribute::MaxHealth, 80.0);

        let hud = RecordingHud::new();
        let mut sink = hud.clone();
        push_all(&mut sink, ActorId::new(2, 0), &attributes);

        let updates = hud.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].bar, HudBar::Health);
        assert_eq!(updates[0].current, 80.0);
    }
}
