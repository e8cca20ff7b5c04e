//! Strafe AI - Enemy Combat AI and Navigation
//!
//! This crate drives enemies through detection, pursuit and attack.
//!
//! # Features
//!
//! - Generic finite state machines with prioritized and global transitions
//! - A navigation contract (`Navigator`) plus a straight-line mover
//! - `EnemyAgent`: perception, pursuit, windup/recovery attack cycles,
//!   death and timed reclamation
//!
//! # Example
//!
//! ```ignore
//! use strafe_ai::prelude::*;
//!
//! let mut fsm = StateMachine::new(EnemyState::Idle);
//! fsm.add_transition(EnemyState::Idle, EnemyState::Pursuing, |ctx: &Ctx| ctx.player_visible);
//! ```

pub mod enemy;
pub mod navigation;
pub mod state_machine;

pub mod prelude {
    pub use crate::enemy::{EnemyAgent, EnemyCues, EnemyEvent, EnemyState, EnemyStats, EnemyTick};
    pub use crate::navigation::{DirectNavigator, NavAgent, Navigator, NullNavigator};
    pub use crate::state_machine::{State, StateChange, StateMachine, Transition};
}

pub use prelude::*;
