//! Gameplay configuration with documented constants
//!
//! Every tuning value the ability core reads lives here. The whole tree is
//! deserializable from TOML; missing sections fall back to [`Default`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abilities::EndAbilityFlags;
use crate::core::types::Seconds;

/// Error type for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration for a world
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Seed for the world RNG (critical hit rolls)
    pub seed: u64,
    pub timing: TimingConfig,
    pub movement: MovementConfig,
    pub combat: CombatConfig,
    pub stamina_costs: StaminaCosts,
    /// Default attribute values granted to player characters
    pub player: CharacterDefaults,
    /// Default attribute values granted to enemies (only health is used)
    pub enemy: CharacterDefaults,
    pub leveling: LevelingRules,
    pub montage_end: MontageEndFlags,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_cafe,
            timing: TimingConfig::default(),
            movement: MovementConfig::default(),
            combat: CombatConfig::default(),
            stamina_costs: StaminaCosts::default(),
            player: CharacterDefaults::default(),
            enemy: CharacterDefaults::default(),
            leveling: LevelingRules::default(),
            montage_end: MontageEndFlags::default(),
        }
    }
}

/// Timer intervals
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Interval of the melee hit probe while a damage window is open
    ///
    /// At 0.01s a 0.25s swing is sampled ~25 times, which keeps fast weapon
    /// arcs from tunnelling past a target between samples.
    pub hit_probe_interval: Seconds,

    /// Interval of the periodic HUD refresh for player characters
    pub hud_refresh_interval: Seconds,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            hit_probe_interval: 0.01,
            hud_refresh_interval: 0.33,
        }
    }
}

/// Character movement tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Max ground speed when not sprinting (units/s)
    pub walk_speed: f32,
    /// Max ground speed while the sprint ability is active (units/s)
    pub sprint_speed: f32,
    /// Initial vertical velocity of a jump (units/s)
    pub jump_z_velocity: f32,
    /// Downward acceleration while airborne (units/s²)
    pub gravity: f32,
    /// Radius of the character collision capsule used by the hit probe
    pub capsule_radius: f32,
    /// Acceleration magnitude above which the pose counts as accelerating
    pub accelerating_threshold: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 500.0,
            sprint_speed: 900.0,
            jump_z_velocity: 420.0,
            gravity: 980.0,
            capsule_radius: 34.0,
            accelerating_threshold: 2.0,
        }
    }
}

/// Melee and damage tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Probability that a received staff hit is critical
    pub crit_chance: f32,
    /// Damage multiplier applied on a critical hit
    pub crit_multiplier: f32,
    /// Damage of a non-critical staff hit
    pub base_damage: f32,
    /// Knockback impulse carried on damage results (0 = none)
    pub knockback_force: f32,
    /// Stun carried on damage results in seconds (0 = none)
    pub stun_duration: Seconds,
    /// Radius of the weapon sweep
    pub probe_radius: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            crit_chance: 0.15,
            crit_multiplier: 2.0,
            base_damage: 20.0,
            knockback_force: 250.0,
            stun_duration: 0.5,
            probe_radius: 20.0,
        }
    }
}

/// Set-by-caller magnitudes for the shared stamina reduction effect
///
/// Values are signed deltas applied to Stamina.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaCosts {
    pub jump: f32,
    pub sprint: f32,
    pub primary_attack: f32,
    pub secondary_attack: f32,
}

impl Default for StaminaCosts {
    fn default() -> Self {
        Self {
            jump: -0.12,
            sprint: -0.12,
            primary_attack: -0.238,
            secondary_attack: -0.5,
        }
    }
}

/// Attribute values applied by the default attribute effect
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterDefaults {
    pub max_health: f32,
    pub max_stamina: f32,
    pub max_adrenaline: f32,
}

impl Default for CharacterDefaults {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_stamina: 100.0,
            max_adrenaline: 100.0,
        }
    }
}

/// Experience curve
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelingRules {
    /// Experience needed to leave level 1
    pub base_max_experience: f32,
    /// Multiplier applied to the requirement for every level gained
    pub growth: f32,
    /// Level cap; reaching it stops further level-ups
    pub max_level: u32,
}

impl LevelingRules {
    /// Experience required to advance past `level`
    pub fn max_experience_for(&self, level: u32) -> f32 {
        let exponent = level.saturating_sub(1) as i32;
        self.base_max_experience * self.growth.powi(exponent)
    }
}

impl Default for LevelingRules {
    fn default() -> Self {
        Self {
            base_max_experience: 100.0,
            growth: 1.5,
            max_level: 50,
        }
    }
}

/// End-ability flags used by each montage termination path
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MontageEndFlags {
    pub completed: EndAbilityFlags,
    pub interrupted: EndAbilityFlags,
    pub cancelled: EndAbilityFlags,
}

impl Default for MontageEndFlags {
    fn default() -> Self {
        Self {
            completed: EndAbilityFlags::new(false, false),
            interrupted: EndAbilityFlags::new(true, false),
            cancelled: EndAbilityFlags::new(false, false),
        }
    }
}

impl GameplayConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_toml(&content)
    }

    /// Parse and validate a config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: GameplayConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.combat.crit_chance) {
            return Err(ConfigError::Invalid(format!(
                "crit_chance ({}) must be within [0, 1]",
                self.combat.crit_chance
            )));
        }

        if self.combat.crit_multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "crit_multiplier ({}) must be >= 1",
                self.combat.crit_multiplier
            )));
        }

        if self.timing.hit_probe_interval <= 0.0 || self.timing.hud_refresh_interval <= 0.0 {
            return Err(ConfigError::Invalid("timer intervals must be positive".into()));
        }

        if self.movement.walk_speed <= 0.0 || self.movement.sprint_speed <= 0.0 {
            return Err(ConfigError::Invalid("movement speeds must be positive".into()));
        }

        for (name, defaults) in [("player", &self.player), ("enemy", &self.enemy)] {
            if defaults.max_health <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name}.max_health must be positive"
                )));
            }
        }

        if self.leveling.base_max_experience <= 0.0 || self.leveling.growth < 1.0 {
            return Err(ConfigError::Invalid(
                "leveling needs base_max_experience > 0 and growth >= 1".into(),
            ));
        }

        Ok(())
    }
}
