//! Montage-driven attack abilities with combo chaining
//!
//! Activation plays the configured montage and listens for the tag windows
//! it carries. The damage window drives the repeating hit probe, the combo
//! window gates chaining into the next ability.

use ahash::AHashSet;

use crate::abilities::{
    AbilityClass, AbilityContext, AbilityFlow, Activatable, EndAbilityFlags, GameplayEventData,
    MontageSettings,
};
use crate::animation::{MontageAsset, MontageEndReason, MontagePlayable};
use crate::tags::{names, GameplayTag};
use crate::world::{TimerHandle, TimerPayload};

#[derive(Debug, Clone)]
pub struct MontageAbility {
    settings: MontageSettings,
    combo_window_open: bool,
    listeners: AHashSet<GameplayTag>,
    probe_timer: Option<TimerHandle>,
}

impl MontageAbility {
    pub fn new(settings: MontageSettings) -> Self {
        Self {
            settings,
            combo_window_open: false,
            listeners: AHashSet::new(),
            probe_timer: None,
        }
    }

    pub fn settings(&self) -> &MontageSettings {
        &self.settings
    }

    pub fn is_combo_window_open(&self) -> bool {
        self.combo_window_open
    }

    pub fn set_combo_window_open(&mut self, open: bool) {
        self.combo_window_open = open;
    }

    pub fn next_combo(&self) -> Option<&AbilityClass> {
        self.settings.next_combo.as_ref()
    }

    pub fn probe_timer(&self) -> Option<TimerHandle> {
        self.probe_timer
    }

    pub fn is_listening_for(&self, tag: &GameplayTag) -> bool {
        self.listeners.contains(tag)
    }

    /// Listen for every window tag of `asset`; safe to call repeatedly
    fn rebuild_listeners(&mut self, asset: &MontageAsset) {
        self.listeners.clear();
        self.listeners.extend(asset.window_tags().cloned());
    }

    /// React to a window tag raised by the playing montage
    pub fn on_notify(&mut self, ctx: &mut AbilityContext<'_>, tag: &GameplayTag) {
        if !self.listeners.contains(tag) {
            return;
        }

        match tag.as_str() {
            names::NOTIFY_DAMAGE_BEGIN => self.begin_damage_window(ctx),
            names::NOTIFY_DAMAGE_END => self.end_damage_window(ctx),
            names::NOTIFY_COMBO_BEGIN => self.combo_window_open = true,
            names::NOTIFY_COMBO_END => self.combo_window_open = false,
            other => tracing::trace!("{} ignoring notify {}", ctx.definition.class, other),
        }
    }

    fn begin_damage_window(&mut self, ctx: &mut AbilityContext<'_>) {
        ctx.state.hit_window.open();

        if let Some(timer) = self.probe_timer.take() {
            ctx.services.timers.cancel(timer);
        }
        let interval = ctx.services.config.timing.hit_probe_interval;
        let payload = TimerPayload::HitProbe {
            ability: ctx.handle,
            start_socket: self.settings.trace_start_socket.clone(),
            end_socket: self.settings.trace_end_socket.clone(),
            radius: self.settings.probe_radius,
            event_tag: self.settings.damage_event_tag.clone(),
        };
        self.probe_timer = Some(ctx.services.timers.start(ctx.owner, interval, true, payload));
    }

    fn end_damage_window(&mut self, ctx: &mut AbilityContext<'_>) {
        if let Some(timer) = self.probe_timer.take() {
            ctx.services.timers.cancel(timer);
        }
        ctx.state.hit_window.close();
    }

    /// Terminal playback callback; the caller ends the ability afterwards
    pub fn on_montage_ended(&mut self, ctx: &mut AbilityContext<'_>, reason: MontageEndReason) {
        tracing::debug!("{} montage ended: {:?}", ctx.definition.class, reason);
        self.combo_window_open = false;
    }
}

impl Activatable for MontageAbility {
    fn activate(&mut self, ctx: &mut AbilityContext<'_>, _trigger: Option<&GameplayEventData>) -> AbilityFlow {
        let failed = AbilityFlow::End(EndAbilityFlags::new(true, false));

        let Some(asset) = ctx.services.montages.get(&self.settings.montage) else {
            tracing::warn!(
                "{} has no montage named {}",
                ctx.definition.class,
                self.settings.montage
            );
            return failed;
        };
        if !ctx.commit() {
            return failed;
        }

        *ctx.combo_step = self.settings.combo_step;
        ctx.state.set_is_attacking(true);

        if let Some(cost) = self.settings.stamina_cost {
            ctx.apply_stamina_delta(cost);
        }

        self.combo_window_open = false;
        self.rebuild_listeners(&asset);
        ctx.displaced = ctx.state.play_montage(asset, ctx.handle);

        AbilityFlow::Continue
    }

    fn cancel_flags(&self, ctx: &AbilityContext<'_>) -> EndAbilityFlags {
        ctx.services.config.montage_end.cancelled
    }

    fn end(&mut self, ctx: &mut AbilityContext<'_>, flags: EndAbilityFlags) {
        if let Some(timer) = self.probe_timer.take() {
            ctx.services.timers.cancel(timer);
        }
        self.combo_window_open = false;

        // A displacing montage now owns the shared attack state
        let owns_playback = ctx
            .state
            .current_montage()
            .map_or(true, |playback| playback.ability == ctx.handle || !playback.is_playing());
        if !owns_playback {
            return;
        }

        let reason = if flags.cancelled {
            MontageEndReason::Cancelled
        } else {
            MontageEndReason::Interrupted
        };
        ctx.state.stop_montage(ctx.handle, reason);
        ctx.state.hit_window.close();
        ctx.state.set_is_attacking(false);
    }
}
