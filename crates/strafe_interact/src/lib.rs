//! Strafe Interact - doors, pickups and usable things
//!
//! This crate provides everything the player touches or uses in a level.
//!
//! # Features
//!
//! - Pickups for health, armor, ammo, weapons, keycards and secrets
//! - Automatic (touch) and interactive pickup modes
//! - Doors locked by keycard, switch or kill count, with auto-close
//! - One-time and reusable switches
//! - Look-at prompts through the host's ray query
//!
//! # Example
//!
//! ```ignore
//! use strafe_interact::prelude::*;
//!
//! let mut system = InteractionSystem::default();
//! system.add_door(Door::new(door_id, DoorSettings::new(DoorLock::Switch), position));
//! system.add_interactable(switch_id, Interactable::switch(vec![door_id], true));
//! ```

pub mod door;
pub mod interaction;
pub mod pickup;

pub mod prelude {
    pub use crate::door::{
        Door, DoorEvent, DoorLock, DoorMotion, DoorResponse, DoorSettings, DoorSounds,
    };
    pub use crate::interaction::{
        InteractContext, Interactable, InteractableKind, InteractionOutcome, InteractionSystem,
        SWITCH_USED_PROMPT,
    };
    pub use crate::pickup::{
        Pickup, PickupDef, PickupEffect, PickupKind, PickupMode, PickupTarget,
    };
}

pub use prelude::*;
