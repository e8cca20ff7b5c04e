//! Strafe GameState - Level Progress and Flow
//!
//! This crate tracks what happened in a level and decides when it ends.
//!
//! # Features
//!
//! - Kill/secret counters, keycards and the level timer (`GameProgress`)
//! - A thread-safe `ProgressHandle`: the extension point for hosts that
//!   update or read progress from other threads
//! - Level completion, game over and pause with delayed scene transitions
//!
//! # Example
//!
//! ```ignore
//! use strafe_gamestate::prelude::*;
//!
//! let mut progress = GameProgress::new();
//! let mut flow = LevelFlow::new(LevelSettings::new("E1M1").with_next_level("E1M2"));
//!
//! progress.record_kill();
//! flow.complete_level(now, &mut progress);
//! flow.update(now + 2.0, &mut scene_loader);
//! ```

pub mod level;
pub mod progress;
pub mod shared;

pub mod prelude {
    pub use crate::level::{LevelFlow, LevelSettings, LevelStatus, LevelTransition, SceneLoader};
    pub use crate::progress::{format_time, GameProgress, LevelSummary};
    pub use crate::shared::ProgressHandle;
}

pub use prelude::*;
