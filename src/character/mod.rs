//! Characters: state shared with abilities plus the ability system itself
//!
//! [`CharacterState`] is everything an ability may touch on its owner. It is
//! kept apart from [`AbilitySystem`] so the system can lend the state to an
//! ability behaviour while it iterates its own specs.

pub mod input;
pub mod movement;

use std::sync::Arc;

use ahash::AHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::abilities::{loadout, AbilityClass, AbilitySpecHandle, AbilitySystem};
use crate::animation::{
    MontageAsset, MontageEndReason, MontagePlayable, MontagePlayback, PlaybackState, TimelineEvent,
};
use crate::attributes::{Attribute, AttributeChange, AttributeProfile, AttributeSet, HasAttributes, ModifierOutcome};
use crate::combat::{CapsuleBody, CollisionCategory, HitWindow};
use crate::core::config::{CharacterDefaults, GameplayConfig, LevelingRules};
use crate::core::types::{ActorId, Seconds};
use crate::effects::{self, catalog, ActiveEffectHandle, ActiveEffects, EffectSpec};
use crate::tags::{names, GameplayTag, HasTags, TagContainer, TagState};

pub use input::{InputAction, InputValue, TriggerEvent};
pub use movement::Movement;

/// Capsule height used for hit probing
pub const CAPSULE_HEIGHT: f32 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterKind {
    Player,
    Enemy,
}

impl CharacterKind {
    pub fn profile(self) -> AttributeProfile {
        match self {
            CharacterKind::Player => AttributeProfile::Player,
            CharacterKind::Enemy => AttributeProfile::Enemy,
        }
    }

    pub fn default_tags(self) -> TagContainer {
        match self {
            CharacterKind::Player => {
                TagContainer::from_static(&[names::TYPE_PLAYER, names::STATE_ALIVE])
            }
            CharacterKind::Enemy => TagContainer::from_static(&[
                names::TYPE_ENEMY,
                names::STATE_ALIVE,
                names::MOVEMENT_CAN_MOVE,
            ]),
        }
    }

    /// Weapon and UI sockets in actor space (x forward, y right, z up)
    pub fn default_sockets(self) -> AHashMap<String, Vec3> {
        let mut sockets = AHashMap::new();
        match self {
            CharacterKind::Player => {
                sockets.insert(loadout::STAFF_START_SOCKET.to_string(), Vec3::new(20.0, 30.0, 110.0));
                sockets.insert(loadout::STAFF_END_SOCKET.to_string(), Vec3::new(120.0, 30.0, 110.0));
                sockets.insert(loadout::STAFF_EXTENDED_SOCKET.to_string(), Vec3::new(200.0, 30.0, 110.0));
            }
            CharacterKind::Enemy => {
                sockets.insert("healthbar_Socket".to_string(), Vec3::new(0.0, 0.0, 200.0));
            }
        }
        sockets
    }
}

/// Something that happened to a character, drained by the world each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CharacterEvent {
    AttributeChanged(AttributeChange),
    Died,
    LevelUp { level: u32 },
    PlaySound { sound: String },
    /// Named montage notify reached on the timeline
    MontageNotify { montage: String, name: String },
    AbilityActivated { class: AbilityClass },
    AbilityEnded { class: AbilityClass, replicate: bool, cancelled: bool },
    AttackingChanged { attacking: bool },
    DamageTaken {
        instigator: Option<ActorId>,
        amount: f32,
        critical: bool,
        knockback: f32,
        stun: Seconds,
    },
    /// Raised on the attacker for every new target in a damage window
    HitLanded { target: ActorId, event_tag: GameplayTag },
}

/// Montage output the ability system must react to
#[derive(Debug, Clone, PartialEq)]
pub enum MontageSignal {
    Notify { ability: AbilitySpecHandle, tag: GameplayTag },
    Ended { ability: AbilitySpecHandle, reason: MontageEndReason },
}

#[derive(Debug)]
pub struct CharacterState {
    pub id: ActorId,
    pub kind: CharacterKind,
    pub name: String,
    pub tags: TagState,
    pub movement: Movement,
    pub hit_window: HitWindow,
    attributes: AttributeSet,
    effects: ActiveEffects,
    sockets: AHashMap<String, Vec3>,
    level: u32,
    defaults: CharacterDefaults,
    leveling: LevelingRules,
    is_attacking: bool,
    dead: bool,
    montage: Option<MontagePlayback>,
    events: Vec<CharacterEvent>,
}

impl CharacterState {
    pub fn new(
        id: ActorId,
        kind: CharacterKind,
        name: impl Into<String>,
        position: Vec3,
        config: &GameplayConfig,
    ) -> Self {
        let defaults = match kind {
            CharacterKind::Player => config.player,
            CharacterKind::Enemy => config.enemy,
        };

        let mut state = Self {
            id,
            kind,
            name: name.into(),
            tags: TagState::new(),
            movement: Movement::new(position, config.movement.walk_speed),
            hit_window: HitWindow::new(),
            attributes: AttributeSet::new(kind.profile()),
            effects: ActiveEffects::new(),
            sockets: kind.default_sockets(),
            level: 1,
            defaults,
            leveling: config.leveling,
            is_attacking: false,
            dead: false,
            montage: None,
            events: Vec::new(),
        };

        state.tags.add_all(&kind.default_tags());
        state.apply_default_attributes();
        if kind == CharacterKind::Player {
            for definition in catalog::player_startup_effects() {
                state.apply_effect(EffectSpec::new(definition).with_instigator(id));
            }
        }
        state
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn is_attacking(&self) -> bool {
        self.is_attacking
    }

    pub fn set_is_attacking(&mut self, attacking: bool) {
        if self.is_attacking != attacking {
            tracing::debug!("{} set is attacking: {}", self.id, attacking);
            self.is_attacking = attacking;
            self.events.push(CharacterEvent::AttackingChanged { attacking });
        }
    }

    pub fn active_effects(&self) -> &ActiveEffects {
        &self.effects
    }

    pub fn push_event(&mut self, event: CharacterEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<CharacterEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[CharacterEvent] {
        &self.events
    }

    fn apply_default_attributes(&mut self) {
        let definition = catalog::default_attributes(
            self.kind.profile(),
            &self.defaults,
            &self.leveling,
            self.level,
        );
        self.apply_effect(EffectSpec::new(definition).with_level(self.level));
    }

    /// Apply an effect; returns a handle for effects that stay active
    pub fn apply_effect(&mut self, spec: EffectSpec) -> Option<ActiveEffectHandle> {
        tracing::trace!("{} applying {}", self.id, spec.definition.name);

        if spec.definition.is_instant() {
            self.execute_spec(&spec);
            return None;
        }

        self.tags.add_all(&spec.definition.granted_tags);
        if spec.definition.period.is_none() || spec.definition.execute_period_on_application {
            self.execute_spec(&spec);
        }
        Some(self.effects.add(spec))
    }

    pub fn remove_effect(&mut self, handle: ActiveEffectHandle) -> bool {
        match self.effects.remove(handle) {
            Some(effect) => {
                self.tags.remove_all(&effect.spec.definition.granted_tags);
                true
            }
            None => false,
        }
    }

    /// Run periodic executions and expire finished effects
    pub fn tick_effects(&mut self, dt: Seconds) {
        let tick = self.effects.tick(dt);

        for handle in tick.executions {
            let Some(effect) = self.effects.get(handle) else {
                continue;
            };
            let outcomes = effects::execute(&effect.spec, &mut self.attributes, &self.tags);
            self.handle_outcomes(outcomes);
        }

        for effect in tick.expired {
            self.tags.remove_all(&effect.spec.definition.granted_tags);
        }
    }

    fn execute_spec(&mut self, spec: &EffectSpec) {
        let outcomes = effects::execute(spec, &mut self.attributes, &self.tags);
        self.handle_outcomes(outcomes);
    }

    fn handle_outcomes(&mut self, outcomes: Vec<ModifierOutcome>) {
        for outcome in outcomes {
            if let Some(change) = outcome.change {
                self.events.push(CharacterEvent::AttributeChanged(change));
                if change.attribute == Attribute::Health && change.new_value <= 0.0 {
                    self.die();
                }
            }
            if outcome.level_up {
                self.level_up();
            }
        }
    }

    fn die(&mut self) {
        if self.dead {
            return;
        }
        self.dead = true;
        self.tags.remove(&GameplayTag::from_static(names::STATE_ALIVE));
        self.tags.add(GameplayTag::from_static(names::STATE_DEAD));
        tracing::info!("{} ({}) died", self.name, self.id);
        self.events.push(CharacterEvent::Died);
    }

    fn level_up(&mut self) {
        if self.level >= self.leveling.max_level {
            tracing::debug!("{} is at the level cap ({})", self.id, self.level);
            return;
        }
        self.level += 1;
        tracing::info!("{} reached level {}", self.id, self.level);
        self.events.push(CharacterEvent::LevelUp { level: self.level });
        self.apply_default_attributes();
    }

    /// World-space location of a socket; unknown sockets resolve to the origin
    pub fn socket_location(&self, name: &str) -> Vec3 {
        match self.sockets.get(name) {
            Some(offset) => {
                let rotation = self.movement.rotation;
                self.movement.position
                    + rotation.forward_xy() * offset.x
                    + rotation.right_xy() * offset.y
                    + Vec3::Z * offset.z
            }
            None => {
                tracing::warn!("Socket '{}' does not exist on {}", name, self.id);
                Vec3::ZERO
            }
        }
    }

    pub fn set_socket(&mut self, name: impl Into<String>, offset: Vec3) {
        self.sockets.insert(name.into(), offset);
    }

    pub fn capsule(&self, radius: f32) -> CapsuleBody {
        CapsuleBody {
            id: self.id,
            category: CollisionCategory::Pawn,
            base: self.movement.position,
            radius,
            height: CAPSULE_HEIGHT,
        }
    }

    /// Advance the playing montage and apply window side effects
    pub fn advance_montage(&mut self, dt: Seconds) -> Vec<MontageSignal> {
        let Some(playback) = self.montage.as_mut() else {
            return Vec::new();
        };
        if !playback.is_playing() {
            return Vec::new();
        }

        let events = playback.advance(dt);
        let mut signals = self.process_timeline(events);

        if let Some(playback) = &self.montage {
            if let PlaybackState::Ended(reason) = playback.state() {
                signals.push(MontageSignal::Ended {
                    ability: playback.ability,
                    reason,
                });
            }
        }
        signals
    }

    fn process_timeline(&mut self, events: Vec<TimelineEvent>) -> Vec<MontageSignal> {
        let Some(playback) = self.montage.as_mut() else {
            return Vec::new();
        };
        let asset = Arc::clone(&playback.asset);
        let ability = playback.ability;
        let mut signals = Vec::new();

        for event in events {
            match event {
                TimelineEvent::WindowBegin(index) => {
                    let Some(window) = asset.window(index) else {
                        continue;
                    };
                    if let Some(required) = &window.required_tag {
                        if !self.tags.has(required) {
                            tracing::trace!("{} skipping {}: missing {}", self.id, window.begin_tag, required);
                            continue;
                        }
                    }
                    self.tags.add_all(&window.add_tags);
                    self.tags.remove_all(&window.remove_tags);
                    playback.mark_applied(index);
                    signals.push(MontageSignal::Notify {
                        ability,
                        tag: window.begin_tag.clone(),
                    });
                }
                TimelineEvent::WindowEnd(index) => {
                    let Some(window) = asset.window(index) else {
                        continue;
                    };
                    if playback.take_applied(index) {
                        self.tags.remove_all(&window.add_tags);
                        self.tags.add_all(&window.remove_tags);
                    }
                    signals.push(MontageSignal::Notify {
                        ability,
                        tag: window.end_tag.clone(),
                    });
                }
                TimelineEvent::Named(name) => {
                    self.events.push(CharacterEvent::MontageNotify {
                        montage: asset.name.clone(),
                        name,
                    });
                }
            }
        }
        signals
    }
}

impl MontagePlayable for CharacterState {
    fn play_montage(&mut self, asset: Arc<MontageAsset>, ability: AbilitySpecHandle) -> Option<AbilitySpecHandle> {
        let mut displaced = None;
        if let Some(playback) = self.montage.as_mut().filter(|p| p.is_playing()) {
            displaced = Some(playback.ability);
            let events = playback.stop(MontageEndReason::Interrupted);
            self.process_timeline(events);
        }

        tracing::debug!("{} playing montage {}", self.id, asset.name);
        self.montage = Some(MontagePlayback::new(asset, ability));
        displaced
    }

    fn stop_montage(&mut self, ability: AbilitySpecHandle, reason: MontageEndReason) -> bool {
        let Some(playback) = self
            .montage
            .as_mut()
            .filter(|p| p.ability == ability && p.is_playing())
        else {
            return false;
        };
        let events = playback.stop(reason);
        self.process_timeline(events);
        true
    }

    fn current_montage(&self) -> Option<&MontagePlayback> {
        self.montage.as_ref()
    }
}

impl HasAttributes for CharacterState {
    fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }
}

impl HasTags for CharacterState {
    fn tags(&self) -> &TagState {
        &self.tags
    }
}

/// A spawned character
#[derive(Debug)]
pub struct Character {
    pub state: CharacterState,
    pub abilities: AbilitySystem,
}

impl Character {
    /// Build a character with its kind's default tags, attributes and loadout
    pub fn new(
        id: ActorId,
        kind: CharacterKind,
        name: impl Into<String>,
        position: Vec3,
        config: &GameplayConfig,
    ) -> Self {
        let state = CharacterState::new(id, kind, name, position, config);
        let mut abilities = AbilitySystem::new(id);

        let definitions = match kind {
            CharacterKind::Player => loadout::player(config),
            CharacterKind::Enemy => loadout::enemy(config),
        };
        for definition in definitions {
            abilities.grant(definition);
        }

        Self { state, abilities }
    }

    pub fn id(&self) -> ActorId {
        self.state.id
    }

    pub fn kind(&self) -> CharacterKind {
        self.state.kind
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }
}

impl HasAttributes for Character {
    fn attributes(&self) -> &AttributeSet {
        self.state.attributes()
    }
}

impl HasTags for Character {
    fn tags(&self) -> &TagState {
        &self.state.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> CharacterState {
        CharacterState::new(
            ActorId::new(0, 0),
            CharacterKind::Player,
            "Wukong",
            Vec3::ZERO,
            &GameplayConfig::default(),
        )
    }

    fn enemy() -> CharacterState {
        CharacterState::new(
            ActorId::new(1, 0),
            CharacterKind::Enemy,
            "Minion",
            Vec3::new(100.0, 0.0, 0.0),
            &GameplayConfig::default(),
        )
    }

    #[test]
    fn test_spawn_defaults() {
        let state = player();
        assert_eq!(state.attributes().get(Attribute::Health), 100.0);
        assert_eq!(state.attributes().get(Attribute::Stamina), 100.0);
        assert_eq!(state.attributes().get(Attribute::MaxExperiencePoints), 100.0);
        assert!(state.has_tag(&GameplayTag::from_static(names::STATE_ALIVE)));
        assert!(state.has_tag(&GameplayTag::from_static(names::TYPE_PLAYER)));
        assert_eq!(state.active_effects().len(), 2);

        let enemy = enemy();
        assert!(enemy.has_tag(&GameplayTag::from_static(names::MOVEMENT_CAN_MOVE)));
        assert!(enemy.active_effects().is_empty());
    }

    #[test]
    fn test_death_swaps_tags_once() {
        let mut state = enemy();
        let damage = || {
            EffectSpec::new(catalog::staff_melee_damage())
                .with_set_by_caller(GameplayTag::from_static(names::DAMAGE_MELEE_STAFF), -150.0)
        };
        state.apply_effect(damage());
        state.apply_effect(damage());

        assert!(!state.is_alive());
        assert!(state.has_tag(&GameplayTag::from_static(names::STATE_DEAD)));
        assert!(!state.has_tag(&GameplayTag::from_static(names::STATE_ALIVE)));
        let deaths = state
            .drain_events()
            .into_iter()
            .filter(|e| *e == CharacterEvent::Died)
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_level_up_resets_experience() {
        let mut state = player();
        let xp = |amount| {
            EffectSpec::new(catalog::experience_gain())
                .with_set_by_caller(GameplayTag::from_static(names::EXPERIENCE_GAIN), amount)
        };

        state.apply_effect(xp(60.0));
        assert_eq!(state.level(), 1);

        state.apply_effect(xp(50.0));
        assert_eq!(state.level(), 2);
        assert_eq!(state.attributes().get(Attribute::ExperiencePoints), 0.0);
        assert_eq!(state.attributes().get(Attribute::MaxExperiencePoints), 150.0);
        assert!(state
            .drain_events()
            .contains(&CharacterEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_cooldown_tag_lifetime() {
        let mut state = player();
        let tag = GameplayTag::from_static(names::COOLDOWN_SECONDARY_ATTACK);
        let handle = state.apply_effect(EffectSpec::new(catalog::cooldown(tag.clone(), 0.5)));

        assert!(handle.is_some());
        assert!(state.has_tag(&tag));
        state.tick_effects(0.6);
        assert!(!state.has_tag(&tag));
    }

    #[test]
    fn test_regeneration_at_full_stamina_is_silent() {
        let mut state = player();
        state.drain_events();

        state.tick_effects(0.35);
        let changes = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, CharacterEvent::AttributeChanged(_)))
            .count();
        assert_eq!(changes, 0);
        assert_eq!(state.attributes().get(Attribute::Stamina), 100.0);
    }

    #[test]
    fn test_jogging_drains_stamina() {
        let mut state = player();
        state.tags.add(GameplayTag::from_static(names::MOVEMENT_JOGGING));

        state.tick_effects(0.5);
        assert_eq!(state.attributes().get(Attribute::Stamina), 98.0);
    }

    #[test]
    fn test_missing_socket_falls_back_to_origin() {
        let state = player();
        assert_eq!(state.socket_location("no_such_socket"), Vec3::ZERO);

        let tip = state.socket_location(loadout::STAFF_END_SOCKET);
        assert!((tip - Vec3::new(120.0, 30.0, 110.0)).length() < 1.0e-3);
    }
}
