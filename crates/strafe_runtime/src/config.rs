//! Level configuration loaded from JSON
//!
//! Every section has `Default` values, so a config file only needs the
//! fields it changes. Call [`GameConfig::validate`] before building a
//! session; [`GameConfig::load`] and [`GameConfig::from_json_str`] do it for
//! you.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use strafe_ai::EnemyStats;
use strafe_combat::{CombatError, ReloadPolicy, WeaponStats};
use strafe_core::CueSet;
use strafe_gamestate::LevelSettings;
use strafe_interact::{DoorSettings, PickupDef, PickupKind};
use thiserror::Error;

/// Config loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// The player's body and audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: f32,
    pub max_armor: f32,
    /// Armor at level start
    pub armor: f32,
    pub spawn: Vec3,
    /// Camera height above the feet; shots and look rays start here
    pub eye_height: f32,
    /// Blood overlay alpha at zero health
    pub overlay_max_alpha: f32,
    /// Blood overlay fade per second
    pub overlay_decay: f32,
    pub hurt_sounds: CueSet,
    pub armor_hit_sounds: CueSet,
    pub death_sound: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_armor: 100.0,
            armor: 0.0,
            spawn: Vec3::ZERO,
            eye_height: 1.6,
            overlay_max_alpha: 0.7,
            overlay_decay: 1.0,
            hurt_sounds: CueSet::default(),
            armor_hit_sounds: CueSet::default(),
            death_sound: None,
        }
    }
}

/// An enemy placed in the level by archetype name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub archetype: String,
    pub position: Vec3,
}

/// A pickup placed in the level by pickup id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSpawn {
    pub pickup: String,
    pub position: Vec3,
}

/// A door placed in the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorSpawn {
    /// Name switches use to refer to the door
    pub name: String,
    pub position: Vec3,
    #[serde(default)]
    pub settings: DoorSettings,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// A wall switch wired to doors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchSpawn {
    pub position: Vec3,
    /// Door names
    pub doors: Vec<String>,
    #[serde(default)]
    pub one_time: bool,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// The exit trigger volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitTrigger {
    pub position: Vec3,
    #[serde(default = "default_exit_radius")]
    pub radius: f32,
}

fn default_exit_radius() -> f32 {
    1.5
}

/// Everything needed to build one level session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for drop rolls and idle cues
    pub seed: u64,
    pub player: PlayerConfig,
    /// Weapon slots in selection order
    pub weapons: Vec<WeaponStats>,
    pub reload_policy: ReloadPolicy,
    /// Enemy archetypes, referenced by name
    pub enemies: Vec<EnemyStats>,
    /// Pickup definitions, referenced by id from spawns and drop tables
    pub pickups: Vec<PickupDef>,
    pub level: LevelSettings,
    pub enemy_spawns: Vec<EnemySpawn>,
    pub pickup_spawns: Vec<PickupSpawn>,
    pub doors: Vec<DoorSpawn>,
    pub switches: Vec<SwitchSpawn>,
    pub exit: Option<ExitTrigger>,
    /// Reach of the player's use ray
    pub interaction_distance: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            player: PlayerConfig::default(),
            weapons: vec![WeaponStats::default()],
            reload_policy: ReloadPolicy::default(),
            enemies: vec![EnemyStats::default()],
            pickups: Vec::new(),
            level: LevelSettings::default(),
            enemy_spawns: Vec::new(),
            pickup_spawns: Vec::new(),
            doors: Vec::new(),
            switches: Vec::new(),
            exit: None,
            interaction_distance: 3.0,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        log::info!("Loading level config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize back to pretty JSON
    pub fn to_json_string(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn archetype(&self, name: &str) -> Option<&EnemyStats> {
        self.enemies.iter().find(|e| e.name == name)
    }

    pub fn pickup(&self, id: &str) -> Option<&PickupDef> {
        self.pickups.iter().find(|p| p.id == id)
    }

    /// Check cross-references and numeric ranges
    pub fn validate(&self) -> ConfigResult<()> {
        let player = &self.player;
        if !(player.max_health.is_finite() && player.max_health > 0.0) {
            return Err(invalid("player.max_health must be positive"));
        }
        if !(player.max_armor >= 0.0 && (0.0..=player.max_armor).contains(&player.armor)) {
            return Err(invalid("player.armor must be within [0, max_armor]"));
        }
        if !(self.interaction_distance.is_finite() && self.interaction_distance > 0.0) {
            return Err(invalid("interaction_distance must be positive"));
        }
        if self.level.level_complete_delay < 0.0 || self.level.game_over_delay < 0.0 {
            return Err(invalid("level delays must be non-negative"));
        }

        if self.weapons.is_empty() {
            return Err(invalid("at least one weapon is required"));
        }
        for weapon in &self.weapons {
            weapon.validate()?;
        }

        let mut names = HashSet::new();
        for enemy in &self.enemies {
            enemy.validate()?;
            if !names.insert(enemy.name.as_str()) {
                return Err(invalid(format!("duplicate enemy archetype '{}'", enemy.name)));
            }
        }

        let mut ids = HashSet::new();
        for pickup in &self.pickups {
            if !ids.insert(pickup.id.as_str()) {
                return Err(invalid(format!("duplicate pickup '{}'", pickup.id)));
            }
            self.validate_pickup(pickup)?;
        }

        for enemy in &self.enemies {
            if let Some(item) = enemy.drops.items.iter().find(|i| !ids.contains(i.as_str())) {
                return Err(invalid(format!(
                    "enemy '{}' drops unknown pickup '{}'",
                    enemy.name, item
                )));
            }
        }
        for spawn in &self.enemy_spawns {
            if !names.contains(spawn.archetype.as_str()) {
                return Err(invalid(format!("unknown enemy archetype '{}'", spawn.archetype)));
            }
        }
        for spawn in &self.pickup_spawns {
            if !ids.contains(spawn.pickup.as_str()) {
                return Err(invalid(format!("unknown pickup '{}'", spawn.pickup)));
            }
        }

        let mut doors = HashSet::new();
        for door in &self.doors {
            if !doors.insert(door.name.as_str()) {
                return Err(invalid(format!("duplicate door '{}'", door.name)));
            }
            if door.settings.open_duration < 0.0 || door.settings.close_delay < 0.0 {
                return Err(invalid(format!("door '{}' has a negative timing", door.name)));
            }
        }
        for switch in &self.switches {
            if let Some(door) = switch.doors.iter().find(|d| !doors.contains(d.as_str())) {
                return Err(invalid(format!("switch wired to unknown door '{}'", door)));
            }
        }

        Ok(())
    }

    fn validate_pickup(&self, pickup: &PickupDef) -> ConfigResult<()> {
        let weapon = match &pickup.kind {
            PickupKind::Health(amount) | PickupKind::Armor(amount) => {
                if !(amount.is_finite() && *amount >= 0.0) {
                    return Err(invalid(format!("pickup '{}' has a negative amount", pickup.id)));
                }
                None
            }
            PickupKind::Ammo { weapon, .. } | PickupKind::Weapon(weapon) => Some(*weapon),
            PickupKind::KeyCard(_) | PickupKind::Secret => None,
        };
        if let Some(index) = weapon.filter(|i| *i >= self.weapons.len()) {
            return Err(invalid(format!(
                "pickup '{}' refers to weapon slot {} of {}",
                pickup.id,
                index,
                self.weapons.len()
            )));
        }
        if !(pickup.radius.is_finite() && pickup.radius > 0.0) {
            return Err(invalid(format!("pickup '{}' needs a positive radius", pickup.id)));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}
