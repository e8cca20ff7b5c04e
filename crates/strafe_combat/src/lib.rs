//! Strafe Combat - Health, Armor, Weapons and Hit Resolution
//!
//! This crate provides the combat core of the shooter layer.
//!
//! # Features
//!
//! - `Vitals`: health and armor with the 2/3 armor absorption rule and a
//!   one-shot death transition
//! - Weapon slots with fire-rate gating, magazine/reserve ammo and
//!   deadline-driven reloads
//! - Hitscan resolution through the host's ray query, plus linear-falloff
//!   area damage
//! - Probability-gated drop tables
//!
//! # Example
//!
//! ```ignore
//! use strafe_combat::prelude::*;
//!
//! let mut vitals = Vitals::new(100.0).with_armor(50.0, 100.0);
//! let outcome = vitals.apply_damage(90.0)?;
//! assert_eq!(vitals.health(), 60.0);
//! ```

pub mod damage;
pub mod error;
pub mod health;
pub mod hit;
pub mod loot;
pub mod weapon;

pub mod prelude {
    pub use crate::damage::{split_armor, ArmorSplit, DamageInfo, DamageKind, ARMOR_ABSORPTION};
    pub use crate::error::{CombatError, CombatResult};
    pub use crate::health::{DamageOutcome, Vitals};
    pub use crate::hit::{
        apply_area_damage, falloff_damage, resolve_shot, AreaDamage, AreaHit, DamageTargets,
        HitOutcome,
    };
    pub use crate::loot::DropTable;
    pub use crate::weapon::{
        FireOutcome, FireRejection, ReloadPolicy, Shot, TriggerInput, WeaponController,
        WeaponEvent, WeaponSlot, WeaponSounds, WeaponStats,
    };
}

pub use prelude::*;
