//! Sprint: raises max speed until cancelled

use crate::abilities::{
    AbilityContext, AbilityFlow, Activatable, EndAbilityFlags, GameplayEventData, SprintSettings,
};
use crate::effects::ActiveEffectHandle;
use crate::tags::{names, GameplayTag};

#[derive(Debug, Clone)]
pub struct SprintAbility {
    settings: SprintSettings,
    cached_walk_speed: Option<f32>,
    periodic_cost: Option<ActiveEffectHandle>,
    tagged: bool,
}

impl SprintAbility {
    pub fn new(settings: SprintSettings) -> Self {
        Self {
            settings,
            cached_walk_speed: None,
            periodic_cost: None,
            tagged: false,
        }
    }

    pub fn cached_walk_speed(&self) -> Option<f32> {
        self.cached_walk_speed
    }
}

impl Activatable for SprintAbility {
    fn activate(&mut self, ctx: &mut AbilityContext<'_>, _trigger: Option<&GameplayEventData>) -> AbilityFlow {
        if !ctx.commit() {
            return AbilityFlow::End(EndAbilityFlags::new(true, true));
        }

        if let Some(sound) = &self.settings.sound {
            ctx.play_sound(sound);
        }

        self.cached_walk_speed = Some(ctx.state.movement.max_walk_speed);
        ctx.state.movement.max_walk_speed = self.settings.sprint_speed;

        ctx.state.tags.add(GameplayTag::from_static(names::MOVEMENT_SPRINTING));
        self.tagged = true;

        if let Some(cost) = self.settings.stamina_cost {
            match self.settings.cost_period {
                Some(period) if period > 0.0 => {
                    self.periodic_cost = ctx.apply_periodic_stamina_delta(cost, period);
                }
                _ => ctx.apply_stamina_delta(cost),
            }
        }

        AbilityFlow::Continue
    }

    fn end(&mut self, ctx: &mut AbilityContext<'_>, _flags: EndAbilityFlags) {
        if let Some(speed) = self.cached_walk_speed.take() {
            ctx.state.movement.max_walk_speed = speed;
        }
        if self.tagged {
            ctx.state.tags.remove(&GameplayTag::from_static(names::MOVEMENT_SPRINTING));
            self.tagged = false;
        }
        if let Some(handle) = self.periodic_cost.take() {
            ctx.state.remove_effect(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{loadout, AbilityDefinition, AbilityKind, AbilitySpecHandle, ComboStep};
    use crate::attributes::{Attribute, HasAttributes};
    use crate::character::{CharacterKind, CharacterState};
    use crate::core::{ActorId, GameplayConfig};
    use crate::world::WorldServices;
    use glam::Vec3;

    fn sprint_def(config: &GameplayConfig, cost_period: Option<f32>) -> AbilityDefinition {
        let mut def = loadout::sprint(config);
        if let AbilityKind::Sprint(settings) = &mut def.kind {
            settings.stamina_cost = Some(-2.0);
            settings.cost_period = cost_period;
        }
        def
    }

    fn run<R>(
        def: &AbilityDefinition,
        state: &mut CharacterState,
        services: &mut WorldServices,
        hook: impl FnOnce(&mut AbilityContext<'_>) -> R,
    ) -> R {
        let mut combo_step = ComboStep::None;
        let mut ctx = AbilityContext {
            handle: AbilitySpecHandle(0),
            owner: state.id,
            definition: def,
            state,
            services,
            combo_step: &mut combo_step,
            displaced: None,
        };
        hook(&mut ctx)
    }

    #[test]
    fn test_commit_failure_ends_cancelled() {
        let config = GameplayConfig::default();
        let mut services = WorldServices::new(config.clone());
        let mut state = CharacterState::new(ActorId::new(0, 0), CharacterKind::Player, "Wukong", Vec3::ZERO, &config);
        let def = sprint_def(&config, None).with_cost(Attribute::Stamina, 500.0);
        let mut sprint = SprintAbility::new(match &def.kind {
            AbilityKind::Sprint(settings) => settings.clone(),
            _ => unreachable!(),
        });

        let flow = run(&def, &mut state, &mut services, |ctx| sprint.activate(ctx, None));
        assert_eq!(flow, AbilityFlow::End(EndAbilityFlags::new(true, true)));
        assert_eq!(state.movement.max_walk_speed, config.movement.walk_speed);
        assert!(sprint.cached_walk_speed().is_none());
    }

    #[test]
    fn test_periodic_cost_removed_on_end() {
        let config = GameplayConfig::default();
        let mut services = WorldServices::new(config.clone());
        let mut state = CharacterState::new(ActorId::new(0, 0), CharacterKind::Player, "Wukong", Vec3::ZERO, &config);
        let def = sprint_def(&config, Some(0.25));
        let mut sprint = SprintAbility::new(match &def.kind {
            AbilityKind::Sprint(settings) => settings.clone(),
            _ => unreachable!(),
        });
        let effects_before = state.active_effects().len();

        let flow = run(&def, &mut state, &mut services, |ctx| sprint.activate(ctx, None));
        assert_eq!(flow, AbilityFlow::Continue);
        assert_eq!(state.active_effects().len(), effects_before + 1);

        for _ in 0..21 {
            state.tick_effects(0.05);
        }
        let drained = state.attribute(Attribute::Stamina);
        assert!(drained <= 92.0, "stamina {}", drained);

        run(&def, &mut state, &mut services, |ctx| {
            sprint.end(ctx, EndAbilityFlags::new(true, true))
        });
        assert_eq!(state.active_effects().len(), effects_before);
        assert_eq!(state.movement.max_walk_speed, config.movement.walk_speed);

        for _ in 0..20 {
            state.tick_effects(0.05);
        }
        assert!(state.attribute(Attribute::Stamina) >= drained);
    }
}
