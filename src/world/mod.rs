//! The world: character arena, shared services and the frame tick
//!
//! Each [`World::tick`] runs, in order: movement, active effects, montage
//! playback (window notifies and terminal callbacks), fired timers (hit
//! probes and HUD refreshes) and finally drains character events into the
//! HUD and the event log.

pub mod events;
pub mod hud;
pub mod timers;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::abilities::{AbilityClass, GameplayEventData};
use crate::animation::MontageLibrary;
use crate::character::{Character, CharacterEvent, CharacterKind, InputAction, InputValue, MontageSignal, TriggerEvent};
use crate::combat::{CapsuleBody, CapsuleOverlapProbe, CollisionCategory, PhysicsProbe, ProbeQuery};
use crate::core::{ActorId, Arena, GameplayConfig, GasError, Result, Seconds};
use crate::effects::{ActiveEffectHandle, EffectSpec};
use crate::tags::{GameplayTag, TagContainer};

pub use events::{EventLog, LogEntry};
pub use hud::{push_all, push_attribute, HudBar, HudSink, HudUpdate, NullHud, RecordingHud};
pub use timers::{FiredTimer, TimerHandle, TimerManager, TimerPayload};

/// Services shared by every character and lent to ability behaviours
#[derive(Debug)]
pub struct WorldServices {
    pub config: GameplayConfig,
    pub rng: ChaCha8Rng,
    pub timers: TimerManager,
    pub montages: MontageLibrary,
    /// Seconds since the world was created
    pub time: Seconds,
}

impl WorldServices {
    pub fn new(config: GameplayConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            timers: TimerManager::new(),
            montages: MontageLibrary::with_defaults(),
            time: 0.0,
        }
    }

    pub fn with_montages(mut self, montages: MontageLibrary) -> Self {
        self.montages = montages;
        self
    }
}

pub struct World {
    characters: Arena<Character>,
    pub services: WorldServices,
    probe: Box<dyn PhysicsProbe>,
    hud: Box<dyn HudSink>,
    log: EventLog,
}

impl World {
    pub fn new(config: GameplayConfig) -> Self {
        Self {
            characters: Arena::new(),
            services: WorldServices::new(config),
            probe: Box::new(CapsuleOverlapProbe),
            hud: Box::new(NullHud),
            log: EventLog::new(),
        }
    }

    pub fn with_probe(mut self, probe: Box<dyn PhysicsProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_hud(mut self, hud: Box<dyn HudSink>) -> Self {
        self.hud = hud;
        self
    }

    pub fn with_montages(mut self, montages: MontageLibrary) -> Self {
        self.services.montages = montages;
        self
    }

    pub fn config(&self) -> &GameplayConfig {
        &self.services.config
    }

    pub fn time(&self) -> Seconds {
        self.services.time
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn character(&self, id: ActorId) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn character_mut(&mut self, id: ActorId) -> Option<&mut Character> {
        self.characters.get_mut(id)
    }

    pub fn characters(&self) -> impl Iterator<Item = (ActorId, &Character)> + '_ {
        self.characters.iter()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Spawn a player; players get a periodic HUD refresh
    pub fn spawn_player(&mut self, name: &str, position: Vec3) -> ActorId {
        let id = self.spawn(CharacterKind::Player, name, position);
        let interval = self.services.config.timing.hud_refresh_interval;
        self.services.timers.start(id, interval, true, TimerPayload::HudRefresh);
        id
    }

    pub fn spawn_enemy(&mut self, name: &str, position: Vec3) -> ActorId {
        self.spawn(CharacterKind::Enemy, name, position)
    }

    fn spawn(&mut self, kind: CharacterKind, name: &str, position: Vec3) -> ActorId {
        let config = &self.services.config;
        let id = self
            .characters
            .insert_with(|id| Character::new(id, kind, name, position, config));
        tracing::info!("Spawned {:?} {} as {}", kind, name, id);

        if let Some(character) = self.characters.get(id) {
            push_all(self.hud.as_mut(), id, character.state.attributes());
        }
        self.flush_events(id);
        id
    }

    /// Remove a character and cancel every timer it owns
    pub fn despawn(&mut self, id: ActorId) -> Result<Character> {
        let character = self.characters.remove(id).ok_or(GasError::ActorNotFound(id))?;
        let cancelled = self.services.timers.cancel_owned_by(id);
        tracing::info!("Despawned {} ({} timers cancelled)", id, cancelled);
        Ok(character)
    }

    fn split(&mut self, id: ActorId) -> Result<(&mut Character, &mut WorldServices)> {
        let character = self.characters.get_mut(id).ok_or(GasError::ActorNotFound(id))?;
        Ok((character, &mut self.services))
    }

    pub fn try_activate_ability_by_tag(&mut self, id: ActorId, tag: &GameplayTag) -> Result<bool> {
        let (character, services) = self.split(id)?;
        let activated = character
            .abilities
            .try_activate_by_tag(tag, &mut character.state, services);
        self.flush_events(id);
        Ok(activated)
    }

    pub fn try_activate_ability_by_class(&mut self, id: ActorId, class: &AbilityClass) -> Result<bool> {
        let (character, services) = self.split(id)?;
        let activated = character
            .abilities
            .try_activate_by_class(class, &mut character.state, services);
        self.flush_events(id);
        Ok(activated)
    }

    pub fn cancel_abilities_with_tags(&mut self, id: ActorId, tags: &TagContainer) -> Result<usize> {
        let (character, services) = self.split(id)?;
        let cancelled = character
            .abilities
            .cancel_abilities_with_tags(tags, &mut character.state, services);
        self.flush_events(id);
        Ok(cancelled)
    }

    pub fn combo_input(&mut self, id: ActorId) -> Result<bool> {
        let (character, services) = self.split(id)?;
        let chained = character.abilities.combo_input(&mut character.state, services);
        self.flush_events(id);
        Ok(chained)
    }

    pub fn set_combo_window_open(&mut self, id: ActorId, open: bool) -> Result<bool> {
        let (character, _) = self.split(id)?;
        Ok(character.abilities.set_combo_window_open(open))
    }

    pub fn handle_input(
        &mut self,
        id: ActorId,
        action: InputAction,
        trigger: TriggerEvent,
        value: InputValue,
    ) -> Result<bool> {
        let (character, services) = self.split(id)?;
        let handled = character.handle_input(action, trigger, value, services);
        self.flush_events(id);
        Ok(handled)
    }

    pub fn apply_effect(&mut self, id: ActorId, spec: EffectSpec) -> Result<Option<ActiveEffectHandle>> {
        let (character, _) = self.split(id)?;
        let handle = character.state.apply_effect(spec);
        self.flush_events(id);
        Ok(handle)
    }

    pub fn remove_effect(&mut self, id: ActorId, handle: ActiveEffectHandle) -> Result<bool> {
        let (character, _) = self.split(id)?;
        Ok(character.state.remove_effect(handle))
    }

    /// Deliver a gameplay event to `target`, returning how many abilities it
    /// triggered
    pub fn send_gameplay_event(&mut self, target: ActorId, event: &GameplayEventData) -> Result<usize> {
        if !self.characters.contains(target) {
            return Err(GasError::ActorNotFound(target));
        }
        let triggered = self.deliver_event(target, event);
        self.flush_events(target);
        Ok(triggered)
    }

    fn deliver_event(&mut self, target: ActorId, event: &GameplayEventData) -> usize {
        let Some(character) = self.characters.get_mut(target) else {
            return 0;
        };
        if !character.is_alive() {
            tracing::trace!("Dropping {} for dead target {}", event.tag, target);
            return 0;
        }
        character
            .abilities
            .handle_gameplay_event(event, &mut character.state, &mut self.services)
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: Seconds) {
        self.services.time += dt;
        let gravity = self.services.config.movement.gravity;
        let ids = self.characters.ids();

        for id in &ids {
            let Some(character) = self.characters.get_mut(*id) else {
                continue;
            };
            character.state.movement.tick(dt, gravity);
            character.state.tick_effects(dt);

            for signal in character.state.advance_montage(dt) {
                match signal {
                    MontageSignal::Notify { ability, tag } => {
                        character
                            .abilities
                            .handle_montage_notify(ability, &tag, &mut character.state, &mut self.services);
                    }
                    MontageSignal::Ended { ability, reason } => {
                        character
                            .abilities
                            .on_montage_ended(ability, reason, &mut character.state, &mut self.services);
                    }
                }
            }
        }

        for fired in self.services.timers.tick(dt) {
            self.fire_timer(fired);
        }

        for id in self.characters.ids() {
            self.flush_events(id);
        }
    }

    fn fire_timer(&mut self, fired: FiredTimer) {
        let alive = self.characters.get(fired.owner).is_some_and(Character::is_alive);
        if !alive {
            tracing::trace!("Dropping timer {:?}: owner {} is gone", fired.handle, fired.owner);
            return;
        }

        match fired.payload {
            TimerPayload::HitProbe {
                start_socket,
                end_socket,
                radius,
                event_tag,
                ..
            } => self.run_hit_probe(fired.owner, &start_socket, &end_socket, radius, event_tag),
            TimerPayload::HudRefresh => {
                if let Some(character) = self.characters.get(fired.owner) {
                    push_all(self.hud.as_mut(), fired.owner, character.state.attributes());
                }
            }
        }
    }

    fn run_hit_probe(
        &mut self,
        owner: ActorId,
        start_socket: &str,
        end_socket: &str,
        radius: f32,
        event_tag: GameplayTag,
    ) {
        let Some(attacker) = self.characters.get(owner) else {
            return;
        };
        if !attacker.state.hit_window.is_open() {
            return;
        }

        let query = ProbeQuery {
            start: attacker.state.socket_location(start_socket),
            end: attacker.state.socket_location(end_socket),
            radius,
            category: CollisionCategory::Pawn,
            ignore: vec![owner],
        };
        let instigator_tags = attacker.state.tags.snapshot();

        let capsule_radius = self.services.config.movement.capsule_radius;
        let bodies: Vec<CapsuleBody> = self
            .characters
            .iter()
            .map(|(_, character)| character.state.capsule(capsule_radius))
            .collect();
        let hits: Vec<ActorId> = self
            .probe
            .sweep(&query, &bodies)
            .into_iter()
            .filter(|target| self.characters.get(*target).is_some_and(Character::is_alive))
            .collect();

        let Some(attacker) = self.characters.get_mut(owner) else {
            return;
        };
        let mut new_targets = Vec::new();
        for target in hits {
            if attacker.state.hit_window.record(target) {
                attacker.state.push_event(CharacterEvent::HitLanded {
                    target,
                    event_tag: event_tag.clone(),
                });
                new_targets.push(target);
            }
        }

        for target in new_targets {
            tracing::debug!("{} hit {} with {}", owner, target, event_tag);
            let event = GameplayEventData::new(event_tag.clone())
                .from_instigator(owner, instigator_tags.clone())
                .to_target(target);
            self.deliver_event(target, &event);
        }
    }

    /// Move pending character events into the HUD and the event log
    fn flush_events(&mut self, id: ActorId) {
        let Some(character) = self.characters.get_mut(id) else {
            return;
        };
        let time = self.services.time;

        for event in character.state.drain_events() {
            if let CharacterEvent::AttributeChanged(change) = &event {
                push_attribute(
                    self.hud.as_mut(),
                    id,
                    change.attribute,
                    change.new_value,
                    change.max_value,
                );
            }
            self.log.record(time, id, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Attribute, HasAttributes};
    use crate::effects::catalog;
    use crate::tags::names;

    fn damage(amount: f32) -> EffectSpec {
        EffectSpec::new(catalog::staff_melee_damage())
            .with_set_by_caller(GameplayTag::from_static(names::DAMAGE_MELEE_STAFF), -amount)
    }

    #[test]
    fn test_spawn_and_despawn() {
        let mut world = World::new(GameplayConfig::default());
        let player = world.spawn_player("Wukong", Vec3::ZERO);
        let enemy = world.spawn_enemy("Minion", Vec3::new(300.0, 0.0, 0.0));

        assert_eq!(world.len(), 2);
        assert_eq!(world.services.timers.len(), 1);

        world.despawn(player).unwrap();
        assert!(world.services.timers.is_empty());
        assert!(world.character(player).is_none());
        assert!(matches!(world.despawn(player), Err(GasError::ActorNotFound(_))));
        assert!(world.character(enemy).is_some());
    }

    #[test]
    fn test_huge_tick_returns() {
        let mut world = World::new(GameplayConfig::default());
        let player = world.spawn_player("Wukong", Vec3::ZERO);

        world.tick(2.0e7);
        let character = world.character(player).unwrap();
        assert!(character.is_alive());
        assert_eq!(character.attribute(Attribute::Stamina), 100.0);
        assert_eq!(world.services.timers.len(), 1);
    }

    #[test]
    fn test_stale_id_reports_not_found() {
        let mut world = World::new(GameplayConfig::default());
        let enemy = world.spawn_enemy("Minion", Vec3::ZERO);
        world.despawn(enemy).unwrap();

        let result = world.apply_effect(enemy, damage(10.0));
        assert!(matches!(result, Err(GasError::ActorNotFound(id)) if id == enemy));
    }

    #[test]
    fn test_hud_refresh_and_changes() {
        let hud = RecordingHud::new();
        let mut world = World::new(GameplayConfig::default()).with_hud(Box::new(hud.clone()));
        let player = world.spawn_player("Wukong", Vec3::ZERO);
        let initial = hud.updates().len();
        assert_eq!(initial, 3);

        world.apply_effect(player, damage(30.0)).unwrap();
        let health = hud.latest(player, HudBar::Health).unwrap();
        assert_eq!(health.current, 70.0);
        assert_eq!(health.max, 100.0);

        world.tick(0.34);
        assert!(hud.updates().len() >= initial + 1 + 3);
    }

    #[test]
    fn test_dead_owner_timers_are_dropped() {
        let hud = RecordingHud::new();
        let mut world = World::new(GameplayConfig::default()).with_hud(Box::new(hud.clone()));
        let player = world.spawn_player("Wukong", Vec3::ZERO);

        world.apply_effect(player, damage(500.0)).unwrap();
        assert!(!world.character(player).unwrap().is_alive());
        let before = hud.updates().len();

        world.tick(1.0);
        assert_eq!(hud.updates().len(), before);
        assert_eq!(world.character(player).unwrap().attribute(Attribute::Health), 0.0);
        assert_eq!(world.log().count_matching(|e| *e == CharacterEvent::Died), 1);
    }
}
