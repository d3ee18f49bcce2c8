//! Jump: launches the character and stays active until the input is released

use crate::abilities::{AbilityContext, AbilityFlow, Activatable, EndAbilityFlags, GameplayEventData, JumpSettings};

#[derive(Debug, Clone, Default)]
pub struct JumpAbility {
    settings: JumpSettings,
}

impl JumpAbility {
    pub fn new(settings: JumpSettings) -> Self {
        Self { settings }
    }
}

impl Activatable for JumpAbility {
    fn activate(&mut self, ctx: &mut AbilityContext<'_>, _trigger: Option<&GameplayEventData>) -> AbilityFlow {
        tracing::debug!("Jump activated for {}", ctx.owner);

        if ctx.state.movement.is_falling {
            return AbilityFlow::End(EndAbilityFlags::new(true, true));
        }

        if !ctx.commit() {
            return AbilityFlow::End(EndAbilityFlags::new(true, true));
        }

        let jump_z = ctx.services.config.movement.jump_z_velocity;
        ctx.state.movement.jump(jump_z);

        if let Some(sound) = &self.settings.sound {
            ctx.play_sound(sound);
        }
        if let Some(cost) = self.settings.stamina_cost {
            ctx.apply_stamina_delta(cost);
        }

        AbilityFlow::Continue
    }

    fn input_released(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityFlow {
        ctx.state.movement.stop_jumping();
        AbilityFlow::End(EndAbilityFlags::new(true, false))
    }

    fn end(&mut self, ctx: &mut AbilityContext<'_>, _flags: EndAbilityFlags) {
        tracing::debug!("Jump ended for {}", ctx.owner);
        ctx.state.movement.stop_jumping();
    }
}
