//! Active (duration and periodic) effects on one target

use serde::{Deserialize, Serialize};

use crate::core::types::Seconds;
use crate::effects::{DurationPolicy, EffectSpec};

/// Upper bound on periodic executions of one effect in a single tick
pub const MAX_EXECUTIONS_PER_TICK: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActiveEffectHandle(pub u32);

#[derive(Debug, Clone)]
pub struct ActiveEffect {
    pub handle: ActiveEffectHandle,
    pub spec: EffectSpec,
    /// Time since application
    pub elapsed: Seconds,
    /// Time since the last periodic execution
    pub since_period: Seconds,
}

impl ActiveEffect {
    fn remaining(&self) -> Option<Seconds> {
        match self.spec.definition.duration {
            DurationPolicy::HasDuration(duration) => Some((duration - self.elapsed).max(0.0)),
            _ => None,
        }
    }
}

/// What happened during one [`ActiveEffects::tick`]
#[derive(Debug, Default)]
pub struct EffectTick {
    /// Periodic executions that fell due, in order; a handle repeats when
    /// several periods elapsed in one step
    pub executions: Vec<ActiveEffectHandle>,
    /// Effects whose duration ran out, already removed
    pub expired: Vec<ActiveEffect>,
}

#[derive(Debug, Clone, Default)]
pub struct ActiveEffects {
    next_handle: u32,
    effects: Vec<ActiveEffect>,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, spec: EffectSpec) -> ActiveEffectHandle {
        let handle = ActiveEffectHandle(self.next_handle);
        self.next_handle += 1;
        self.effects.push(ActiveEffect {
            handle,
            spec,
            elapsed: 0.0,
            since_period: 0.0,
        });
        handle
    }

    pub fn remove(&mut self, handle: ActiveEffectHandle) -> Option<ActiveEffect> {
        let index = self.effects.iter().position(|e| e.handle == handle)?;
        Some(self.effects.remove(index))
    }

    pub fn get(&self, handle: ActiveEffectHandle) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.handle == handle)
    }

    pub fn contains(&self, handle: ActiveEffectHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> + '_ {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Remove every effect, returning them so granted tags can be released
    pub fn drain(&mut self) -> Vec<ActiveEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Advance all effects by `dt`
    pub fn tick(&mut self, dt: Seconds) -> EffectTick {
        let mut result = EffectTick::default();

        for effect in &mut self.effects {
            // Periods past a duration's end do not fire
            let step = effect.remaining().map_or(dt, |remaining| dt.min(remaining));

            if let Some(period) = effect.spec.definition.period.filter(|p| *p > 0.0) {
                effect.since_period += step;
                if effect.since_period >= period {
                    let due = (effect.since_period / period).floor();
                    effect.since_period = (effect.since_period - due * period).clamp(0.0, period);
                    let count = (due as usize).min(MAX_EXECUTIONS_PER_TICK);
                    result
                        .executions
                        .extend(std::iter::repeat(effect.handle).take(count));
                }
            }
            effect.elapsed += dt;
        }

        let mut index = 0;
        while index < self.effects.len() {
            if self.effects[index].remaining() == Some(0.0) {
                result.expired.push(self.effects.remove(index));
            } else {
                index += 1;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::catalog;
    use crate::tags::{names, GameplayTag};

    #[test]
    fn test_periodic_executions() {
        let mut active = ActiveEffects::new();
        let handle = active.add(EffectSpec::new(catalog::jogging_stamina_reduction()));

        let tick = active.tick(0.3);
        assert!(tick.executions.is_empty());

        let tick = active.tick(0.3);
        assert_eq!(tick.executions, vec![handle]);

        // Large step fires several periods
        let tick = active.tick(1.0);
        assert_eq!(tick.executions.len(), 2);
    }

    #[test]
    fn test_huge_step_is_bounded() {
        let mut active = ActiveEffects::new();
        let handle = active.add(EffectSpec::new(catalog::stamina_regeneration()));

        let tick = active.tick(2.0e7);
        assert_eq!(tick.executions.len(), MAX_EXECUTIONS_PER_TICK);
        assert!(tick.executions.iter().all(|h| *h == handle));

        let since = active.get(handle).unwrap().since_period;
        assert!((0.0..=0.35).contains(&since));
    }

    #[test]
    fn test_duration_expiry() {
        let mut active = ActiveEffects::new();
        let def = catalog::cooldown(GameplayTag::from_static(names::COOLDOWN_SECONDARY_ATTACK), 1.0);
        let handle = active.add(EffectSpec::new(def));

        assert!(active.tick(0.6).expired.is_empty());
        let tick = active.tick(0.6);
        assert_eq!(tick.expired.len(), 1);
        assert_eq!(tick.expired[0].handle, handle);
        assert!(active.is_empty());
    }

    #[test]
    fn test_remove_by_handle() {
        let mut active = ActiveEffects::new();
        let a = active.add(EffectSpec::new(catalog::stamina_regeneration()));
        let b = active.add(EffectSpec::new(catalog::jogging_stamina_reduction()));

        assert!(active.remove(a).is_some());
        assert!(active.remove(a).is_none());
        assert!(active.contains(b));
        assert_eq!(active.len(), 1);
    }
}
