//! # strafe_core - Strafe Core
//!
//! Primitives shared by every gameplay crate:
//! - **Ids**: generational entity identifiers
//! - **Time**: the level clock and deadline timestamps that replace
//!   engine coroutines
//! - **Queries**: the ray/overlap contract the physics host implements
//! - **Feedback**: fire-and-forget effect, sound and camera-shake calls
//!
//! The core never talks to an engine directly. Hosts implement
//! [`PhysicsQuery`] and [`Feedback`] and drive everything through a tick.

pub mod feedback;
pub mod id;
pub mod query;
pub mod time;

pub use feedback::*;
pub use id::*;
pub use query::*;
pub use time::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::feedback::{CueSet, EffectKind, Feedback, NullFeedback, RecordingFeedback};
    pub use crate::id::{EntityId, IdAllocator};
    pub use crate::query::{
        CollisionLayer, LayerMask, Overlap, PhysicsQuery, RaycastHit, RaycastOptions,
    };
    pub use crate::time::{Deadline, GameClock};
    pub use glam::Vec3;
}
