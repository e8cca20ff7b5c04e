//! Strafe Runtime - Level Sessions and the Headless Simulator
//!
//! This crate wires the gameplay crates into one per-level session.
//!
//! # Features
//!
//! - JSON level config with defaults and validation
//! - `LevelSession`: the per-frame tick (weapons, enemies, deaths, doors,
//!   pickups, level flow) returning an ordered event log
//! - `SphereWorld`: an analytic ray/overlap world for headless runs
//!
//! # Example
//!
//! ```ignore
//! use strafe_runtime::prelude::*;
//!
//! let mut session = LevelSession::new(GameConfig::from_json_str(json)?)?;
//! let mut host = Host { feedback: &mut feedback, scenes: &mut scenes };
//! let events = session.tick(1.0 / 60.0, &PlayerInput::default(), &mut host)?;
//! ```

pub mod config;
pub mod events;
pub mod player;
pub mod sandbox;
pub mod session;

/// Level config bundled with the binary
pub const DEFAULT_LEVEL: &str = include_str!("../assets/default_level.json");

pub mod prelude {
    pub use crate::config::{
        ConfigError, ConfigResult, DoorSpawn, EnemySpawn, ExitTrigger, GameConfig, PickupSpawn,
        PlayerConfig, SwitchSpawn,
    };
    pub use crate::events::GameEvent;
    pub use crate::player::Player;
    pub use crate::sandbox::{Collider, Shape, SphereWorld};
    pub use crate::session::{Host, LevelSession, PlayerInput, Roster};
    pub use crate::DEFAULT_LEVEL;
}

pub use prelude::*;
