//! Attribute store
//!
//! Two write paths exist:
//! - [`AttributeSet::set`] is the direct base write. Base values are clamped
//!   into `[0, max]`. Writing a max attribute overrides its paired base to
//!   the new max whenever the max actually changes (writing
//!   `MaxExperiencePoints` always zeroes experience).
//! - [`AttributeSet::execute_modifier`] is the effect path: the modifier is
//!   applied raw, then the base attribute is clamped and a change is reported.

use crate::attributes::{Attribute, AttributeChange, AttributeProfile};
use crate::core::types::{nearly_equal, ActorId};
use crate::effects::ModifierOp;

/// Result of executing one modifier against the store
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModifierOutcome {
    /// Change to report, `None` when suppressed or not reportable
    pub change: Option<AttributeChange>,
    /// Experience reached or passed its max
    pub level_up: bool,
}

#[derive(Debug, Clone)]
pub struct AttributeSet {
    profile: AttributeProfile,
    values: [f32; 8],
}

impl AttributeSet {
    pub fn new(profile: AttributeProfile) -> Self {
        Self {
            profile,
            values: [0.0; 8],
        }
    }

    pub fn profile(&self) -> AttributeProfile {
        self.profile
    }

    pub fn supports(&self, attribute: Attribute) -> bool {
        self.profile.supports(attribute)
    }

    /// Current value; unsupported attributes read as zero
    pub fn get(&self, attribute: Attribute) -> f32 {
        if !self.supports(attribute) {
            return 0.0;
        }
        self.values[attribute.index()]
    }

    /// Max paired with `attribute`, if any
    pub fn max_of(&self, attribute: Attribute) -> Option<f32> {
        attribute.max_attribute().map(|max| self.get(max))
    }

    /// Direct base write
    pub fn set(&mut self, attribute: Attribute, value: f32) {
        if !self.supports(attribute) {
            tracing::warn!(
                "Attribute {:?} is not part of the {:?} profile",
                attribute,
                self.profile
            );
            return;
        }

        if let Some(base) = attribute.base_attribute() {
            self.adjust_for_max_change(attribute, base, value);
        }
        self.values[attribute.index()] = value;
        if attribute != Attribute::ExperiencePoints {
            self.clamp_to_max(attribute);
        }
    }

    fn adjust_for_max_change(&mut self, max: Attribute, base: Attribute, new_max: f32) {
        if max == Attribute::MaxExperiencePoints {
            self.values[base.index()] = 0.0;
            return;
        }

        let current_max = self.values[max.index()];
        if !nearly_equal(current_max, new_max) {
            self.values[base.index()] = new_max;
        }
    }

    /// Clamp a base attribute into `[0, max]`
    pub fn clamp_to_max(&mut self, attribute: Attribute) {
        if let Some(max) = self.max_of(attribute) {
            let value = &mut self.values[attribute.index()];
            *value = value.clamp(0.0, max.max(0.0));
        }
    }

    /// Execute one effect modifier
    pub fn execute_modifier(
        &mut self,
        attribute: Attribute,
        op: ModifierOp,
        magnitude: f32,
        instigator: Option<ActorId>,
    ) -> ModifierOutcome {
        if !self.supports(attribute) {
            tracing::debug!(
                "Skipping modifier on {:?}: not part of the {:?} profile",
                attribute,
                self.profile
            );
            return ModifierOutcome::default();
        }

        let delta = match op {
            ModifierOp::Additive => magnitude,
            ModifierOp::Override => 0.0,
        };
        let raw = op.apply(self.values[attribute.index()], magnitude);

        if attribute.is_max() {
            self.set(attribute, raw);
            return ModifierOutcome::default();
        }

        let max_value = self.max_of(attribute).unwrap_or(f32::MAX);
        let mut outcome = ModifierOutcome::default();
        let mut notify = true;

        match attribute {
            Attribute::Stamina => {
                // Regeneration at full stamina overshoots by exactly its own
                // magnitude; that correction is not reported.
                let overflow = raw > max_value && nearly_equal(raw - delta, max_value);
                self.values[attribute.index()] = raw;
                self.clamp_to_max(attribute);
                notify = !overflow;
            }
            Attribute::ExperiencePoints => {
                self.values[attribute.index()] = raw;
                outcome.level_up = raw - max_value >= 0.0;
            }
            _ => {
                self.values[attribute.index()] = raw;
                self.clamp_to_max(attribute);
            }
        }

        if notify {
            outcome.change = Some(AttributeChange {
                attribute,
                delta,
                new_value: self.values[attribute.index()],
                max_value,
                instigator,
            });
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_set() -> AttributeSet {
        let mut set = AttributeSet::new(AttributeProfile::Player);
        set.set(Attribute::MaxHealth, 100.0);
        set.set(Attribute::MaxStamina, 100.0);
        set.set(Attribute::MaxAdrenaline, 100.0);
        set.set(Attribute::MaxExperiencePoints, 100.0);
        set
    }

    #[test]
    fn test_max_change_overrides_base() {
        let mut set = player_set();
        set.set(Attribute::Health, 40.0);

        set.set(Attribute::MaxHealth, 150.0);
        assert_eq!(set.get(Attribute::Health), 150.0);

        set.set(Attribute::Health, 40.0);
        set.set(Attribute::MaxHealth, 80.0);
        assert_eq!(set.get(Attribute::Health), 80.0);
    }

    #[test]
    fn test_same_max_leaves_base() {
        let mut set = player_set();
        set.set(Attribute::Health, 40.0);
        set.set(Attribute::MaxHealth, 100.0);
        assert_eq!(set.get(Attribute::Health), 40.0);
    }

    #[test]
    fn test_direct_write_is_clamped() {
        let mut set = player_set();
        set.set(Attribute::Health, 500.0);
        assert_eq!(set.get(Attribute::Health), 100.0);

        set.set(Attribute::Health, -20.0);
        assert_eq!(set.get(Attribute::Health), 0.0);

        set.set(Attribute::Stamina, 130.0);
        assert_eq!(set.get(Attribute::Stamina), 100.0);

        // Experience has no clamp
        set.set(Attribute::ExperiencePoints, 250.0);
        assert_eq!(set.get(Attribute::ExperiencePoints), 250.0);
    }

    #[test]
    fn test_max_experience_write_zeroes_experience() {
        let mut set = player_set();
        set.set(Attribute::ExperiencePoints, 60.0);
        set.set(Attribute::MaxExperiencePoints, 100.0);
        assert_eq!(set.get(Attribute::ExperiencePoints), 0.0);
    }

    #[test]
    fn test_health_clamped_and_reported() {
        let mut set = player_set();
        let outcome = set.execute_modifier(Attribute::Health, ModifierOp::Additive, -250.0, None);
        assert_eq!(set.get(Attribute::Health), 0.0);

        let change = outcome.change.unwrap();
        assert_eq!(change.delta, -250.0);
        assert_eq!(change.new_value, 0.0);
        assert_eq!(change.max_value, 100.0);
    }

    #[test]
    fn test_stamina_overflow_suppressed() {
        let mut set = player_set();
        assert_eq!(set.get(Attribute::Stamina), 100.0);

        let outcome = set.execute_modifier(Attribute::Stamina, ModifierOp::Additive, 1.0, None);
        assert!(outcome.change.is_none());
        assert_eq!(set.get(Attribute::Stamina), 100.0);
    }

    #[test]
    fn test_stamina_partial_overflow_reported() {
        let mut set = player_set();
        set.set(Attribute::Stamina, 99.5);

        let outcome = set.execute_modifier(Attribute::Stamina, ModifierOp::Additive, 1.0, None);
        assert!(outcome.change.is_some());
        assert_eq!(set.get(Attribute::Stamina), 100.0);
    }

    #[test]
    fn test_experience_level_up_flag() {
        let mut set = player_set();
        let outcome = set.execute_modifier(Attribute::ExperiencePoints, ModifierOp::Additive, 60.0, None);
        assert!(!outcome.level_up);

        let outcome = set.execute_modifier(Attribute::ExperiencePoints, ModifierOp::Additive, 40.0, None);
        assert!(outcome.level_up);
        // Experience is not clamped
        let outcome = set.execute_modifier(Attribute::ExperiencePoints, ModifierOp::Additive, 10.0, None);
        assert!(outcome.level_up);
        assert_eq!(set.get(Attribute::ExperiencePoints), 110.0);
    }

    #[test]
    fn test_override_on_max_routes_through_set() {
        let mut set = player_set();
        set.set(Attribute::Stamina, 10.0);
        let outcome = set.execute_modifier(Attribute::MaxStamina, ModifierOp::Override, 120.0, None);
        assert!(outcome.change.is_none());
        assert_eq!(set.get(Attribute::MaxStamina), 120.0);
        assert_eq!(set.get(Attribute::Stamina), 120.0);
    }

    #[test]
    fn test_enemy_ignores_stamina() {
        let mut set = AttributeSet::new(AttributeProfile::Enemy);
        set.set(Attribute::MaxHealth, 50.0);
        let outcome = set.execute_modifier(Attribute::Stamina, ModifierOp::Additive, -5.0, None);
        assert!(outcome.change.is_none());
        assert_eq!(set.get(Attribute::Stamina), 0.0);
        assert_eq!(set.get(Attribute::Health), 50.0);
    }
}
