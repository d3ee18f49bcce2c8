//! Per-character ability system
//!
//! Owns the granted specs and drives their lifecycle: tag gating, commit
//! checks, cancellation by tag, gameplay event triggers, montage callbacks
//! and combo chaining.

use crate::abilities::context::check_commit;
use crate::abilities::{
    AbilityClass, AbilityContext, AbilityDefinition, AbilityFlow, AbilityInstance, AbilitySpec,
    AbilitySpecHandle, AbilityState, Activatable, ComboStep, EndAbilityFlags, GameplayEventData,
};
use crate::animation::MontageEndReason;
use crate::character::{CharacterEvent, CharacterState};
use crate::core::error::{GasError, Result};
use crate::core::types::ActorId;
use crate::tags::{GameplayTag, TagContainer};
use crate::world::WorldServices;

#[derive(Debug)]
pub struct AbilitySystem {
    owner: ActorId,
    specs: Vec<AbilitySpec>,
    next_handle: u32,
    current_combo_step: ComboStep,
    last_activated: Option<AbilitySpecHandle>,
}

impl AbilitySystem {
    pub fn new(owner: ActorId) -> Self {
        Self {
            owner,
            specs: Vec::new(),
            next_handle: 0,
            current_combo_step: ComboStep::None,
            last_activated: None,
        }
    }

    pub fn owner(&self) -> ActorId {
        self.owner
    }

    pub fn grant(&mut self, definition: AbilityDefinition) -> AbilitySpecHandle {
        let handle = AbilitySpecHandle(self.next_handle);
        self.next_handle += 1;
        tracing::debug!("{} granted {} as {}", self.owner, definition.class, handle);
        self.specs.push(AbilitySpec::new(handle, definition));
        handle
    }

    pub fn spec(&self, handle: AbilitySpecHandle) -> Option<&AbilitySpec> {
        self.specs.iter().find(|s| s.handle == handle)
    }

    pub fn specs(&self) -> impl Iterator<Item = &AbilitySpec> + '_ {
        self.specs.iter()
    }

    pub fn state_of(&self, handle: AbilitySpecHandle) -> Option<AbilityState> {
        self.spec(handle).map(|s| s.state)
    }

    pub fn find_by_class(&self, class: &AbilityClass) -> Option<AbilitySpecHandle> {
        self.specs
            .iter()
            .find(|s| &s.definition.class == class)
            .map(|s| s.handle)
    }

    pub fn active_handles(&self) -> Vec<AbilitySpecHandle> {
        self.specs
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.handle)
            .collect()
    }

    pub fn current_combo_step(&self) -> ComboStep {
        self.current_combo_step
    }

    pub fn set_current_combo_step(&mut self, step: ComboStep) {
        self.current_combo_step = step;
    }

    pub fn last_activated(&self) -> Option<AbilitySpecHandle> {
        self.last_activated
    }

    /// True if an active montage ability has its combo window open
    pub fn is_combo_window_open(&self) -> bool {
        self.specs.iter().any(|s| {
            s.is_active() && s.instance.montage().is_some_and(|m| m.is_combo_window_open())
        })
    }

    fn index_of(&self, handle: AbilitySpecHandle) -> Option<usize> {
        self.specs.iter().position(|s| s.handle == handle)
    }

    /// Run `hook` against one spec's instance with a fresh context
    fn with_context<R>(
        &mut self,
        index: usize,
        state: &mut CharacterState,
        services: &mut WorldServices,
        hook: impl FnOnce(&mut AbilityInstance, &mut AbilityContext<'_>) -> R,
    ) -> (R, Option<AbilitySpecHandle>) {
        let owner = self.owner;
        let spec = &mut self.specs[index];
        let mut ctx = AbilityContext {
            handle: spec.handle,
            owner,
            definition: &spec.definition,
            state,
            services,
            combo_step: &mut self.current_combo_step,
            displaced: None,
        };
        let result = hook(&mut spec.instance, &mut ctx);
        (result, ctx.displaced)
    }

    /// Activate an ability, reporting why activation was refused
    pub fn activate(
        &mut self,
        handle: AbilitySpecHandle,
        state: &mut CharacterState,
        services: &mut WorldServices,
        trigger: Option<&GameplayEventData>,
    ) -> Result<()> {
        let index = self
            .index_of(handle)
            .ok_or(GasError::InvalidAbilityHandle(handle))?;

        {
            let spec = &self.specs[index];
            let definition = &spec.definition;
            if spec.is_active() {
                return Err(GasError::AbilityAlreadyActive(definition.class.clone()));
            }
            if !state.tags.has_all(&definition.activation_required_tags)
                || state.tags.has_any(&definition.activation_blocked_tags)
            {
                return Err(GasError::ActivationBlocked(definition.class.clone()));
            }
            check_commit(definition, state).map_err(|reason| GasError::CommitFailed {
                class: definition.class.clone(),
                reason,
            })?;
        }

        let cancel_tags = self.specs[index].definition.cancel_abilities_with_tags.clone();
        if !cancel_tags.is_empty() {
            self.cancel_matching(&cancel_tags, Some(handle), state, services);
        }

        let spec = &mut self.specs[index];
        spec.state = AbilityState::Committing;
        state.tags.add_all(&spec.definition.activation_owned_tags);
        spec.state = AbilityState::Active;
        spec.activation_count += 1;
        let class = spec.definition.class.clone();

        self.last_activated = Some(handle);
        tracing::debug!("{} activated {}", self.owner, class);
        state.push_event(CharacterEvent::AbilityActivated { class });

        let (flow, displaced) =
            self.with_context(index, state, services, |instance, ctx| instance.activate(ctx, trigger));

        if let Some(other) = displaced.filter(|other| *other != handle) {
            self.on_montage_ended(other, MontageEndReason::Interrupted, state, services);
        }
        if let AbilityFlow::End(flags) = flow {
            self.end_ability(handle, flags, state, services);
        }

        Ok(())
    }

    pub fn try_activate(
        &mut self,
        handle: AbilitySpecHandle,
        state: &mut CharacterState,
        services: &mut WorldServices,
        trigger: Option<&GameplayEventData>,
    ) -> bool {
        match self.activate(handle, state, services, trigger) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("{} activation refused: {}", self.owner, err);
                false
            }
        }
    }

    pub fn try_activate_by_class(
        &mut self,
        class: &AbilityClass,
        state: &mut CharacterState,
        services: &mut WorldServices,
    ) -> bool {
        match self.find_by_class(class) {
            Some(handle) => self.try_activate(handle, state, services, None),
            None => {
                tracing::debug!("{}", GasError::AbilityNotGranted(class.clone()));
                false
            }
        }
    }

    /// Activate the first granted ability whose asset tags match `tag`
    pub fn try_activate_by_tag(
        &mut self,
        tag: &GameplayTag,
        state: &mut CharacterState,
        services: &mut WorldServices,
    ) -> bool {
        let candidates: Vec<AbilitySpecHandle> = self
            .specs
            .iter()
            .filter(|s| s.definition.asset_tags.has(tag))
            .map(|s| s.handle)
            .collect();

        candidates
            .into_iter()
            .any(|handle| self.try_activate(handle, state, services, None))
    }

    /// End an active ability; ended or unknown handles are ignored
    pub fn end_ability(
        &mut self,
        handle: AbilitySpecHandle,
        flags: EndAbilityFlags,
        state: &mut CharacterState,
        services: &mut WorldServices,
    ) -> bool {
        let Some(index) = self.index_of(handle) else {
            return false;
        };
        if !self.specs[index].is_active() {
            tracing::trace!("{} is not active, ignoring end", handle);
            return false;
        }

        self.with_context(index, state, services, |instance, ctx| instance.end(ctx, flags));

        let spec = &mut self.specs[index];
        state.tags.remove_all(&spec.definition.activation_owned_tags);
        spec.state = AbilityState::ended(flags);

        tracing::debug!(
            "{} ended {} (replicate: {}, cancelled: {})",
            self.owner,
            spec.definition.class,
            flags.replicate,
            flags.cancelled
        );
        state.push_event(CharacterEvent::AbilityEnded {
            class: spec.definition.class.clone(),
            replicate: flags.replicate,
            cancelled: flags.cancelled,
        });
        true
    }

    /// Cancel every active ability whose asset tags match any of `tags`
    pub fn cancel_abilities_with_tags(
        &mut self,
        tags: &TagContainer,
        state: &mut CharacterState,
        services: &mut WorldServices,
    ) -> usize {
        self.cancel_matching(tags, None, state, services)
    }

    fn cancel_matching(
        &mut self,
        tags: &TagContainer,
        except: Option<AbilitySpecHandle>,
        state: &mut CharacterState,
        services: &mut WorldServices,
    ) -> usize {
        let matching: Vec<AbilitySpecHandle> = self
            .specs
            .iter()
            .filter(|s| s.is_active() && Some(s.handle) != except && s.definition.asset_tags.has_any(tags))
            .map(|s| s.handle)
            .collect();

        let mut cancelled = 0;
        for handle in matching {
            let Some(index) = self.index_of(handle) else {
                continue;
            };
            let (flags, _) =
                self.with_context(index, state, services, |instance, ctx| instance.cancel_flags(ctx));
            if self.end_ability(handle, flags, state, services) {
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Forward an input release to active abilities matching `tag`
    pub fn input_released(
        &mut self,
        tag: &GameplayTag,
        state: &mut CharacterState,
        services: &mut WorldServices,
    ) -> usize {
        let matching: Vec<AbilitySpecHandle> = self
            .specs
            .iter()
            .filter(|s| s.is_active() && s.definition.asset_tags.has(tag))
            .map(|s| s.handle)
            .collect();

        let mut ended = 0;
        for handle in matching {
            let Some(index) = self.index_of(handle) else {
                continue;
            };
            let (flow, _) =
                self.with_context(index, state, services, |instance, ctx| instance.input_released(ctx));
            if let AbilityFlow::End(flags) = flow {
                if self.end_ability(handle, flags, state, services) {
                    ended += 1;
                }
            }
        }
        ended
    }

    /// Activate every ability triggered by `event`, returning how many started
    pub fn handle_gameplay_event(
        &mut self,
        event: &GameplayEventData,
        state: &mut CharacterState,
        services: &mut WorldServices,
    ) -> usize {
        let triggered: Vec<AbilitySpecHandle> = self
            .specs
            .iter()
            .filter(|s| s.definition.triggers.iter().any(|t| event.tag.matches(t)))
            .map(|s| s.handle)
            .collect();

        triggered
            .into_iter()
            .filter(|handle| self.try_activate(*handle, state, services, Some(event)))
            .count()
    }

    /// Deliver a montage window tag to the ability that owns the montage
    pub fn handle_montage_notify(
        &mut self,
        ability: AbilitySpecHandle,
        tag: &GameplayTag,
        state: &mut CharacterState,
        services: &mut WorldServices,
    ) {
        let Some(index) = self.index_of(ability) else {
            return;
        };
        if !self.specs[index].is_active() {
            return;
        }
        self.with_context(index, state, services, |instance, ctx| {
            if let Some(montage) = instance.montage_mut() {
                montage.on_notify(ctx, tag);
            }
        });
    }

    /// Terminal montage callback: ends the owning ability with the flags
    /// configured for `reason`
    pub fn on_montage_ended(
        &mut self,
        ability: AbilitySpecHandle,
        reason: MontageEndReason,
        state: &mut CharacterState,
        services: &mut WorldServices,
    ) -> bool {
        let Some(index) = self.index_of(ability) else {
            return false;
        };
        if !self.specs[index].is_active() {
            return false;
        }

        self.with_context(index, state, services, |instance, ctx| {
            if let Some(montage) = instance.montage_mut() {
                montage.on_montage_ended(ctx, reason);
            }
        });

        let end_flags = services.config.montage_end;
        let flags = match reason {
            MontageEndReason::Completed => end_flags.completed,
            MontageEndReason::Interrupted => end_flags.interrupted,
            MontageEndReason::Cancelled => end_flags.cancelled,
        };
        self.end_ability(ability, flags, state, services)
    }

    /// Chain into the next combo ability if a combo window is open
    pub fn combo_input(&mut self, state: &mut CharacterState, services: &mut WorldServices) -> bool {
        let current = self.specs.iter().find(|s| {
            s.is_active() && s.instance.montage().is_some_and(|m| m.is_combo_window_open())
        });
        let Some(current) = current else {
            tracing::trace!("{} combo input outside a combo window", self.owner);
            return false;
        };
        let handle = current.handle;
        let Some(next) = current.instance.montage().and_then(|m| m.next_combo().cloned()) else {
            return false;
        };

        self.end_ability(handle, EndAbilityFlags::new(true, false), state, services);
        self.try_activate_by_class(&next, state, services)
    }

    /// Open or close the combo window of every active montage ability
    pub fn set_combo_window_open(&mut self, open: bool) -> bool {
        let mut any = false;
        for spec in self.specs.iter_mut().filter(|s| s.state.is_active()) {
            if let Some(montage) = spec.instance.montage_mut() {
                montage.set_combo_window_open(open);
                any = true;
            }
        }
        any
    }
}
