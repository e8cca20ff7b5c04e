//! Session event log
//!
//! Each tick returns the events it produced, in the order they happened.
//! HUD and audio layers observe these after damage has been applied.

use glam::Vec3;
use strafe_ai::{EnemyState, StateChange};
use strafe_combat::{DamageInfo, DamageOutcome, FireRejection, WeaponEvent};
use strafe_core::EntityId;
use strafe_gamestate::{LevelStatus, LevelTransition};
use strafe_interact::{DoorEvent, DoorResponse, PickupEffect};

/// Something that happened during a session tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Player weapon fired a round
    ShotFired { weapon: usize, ammo_left: u32 },
    /// Trigger pulled on an empty magazine
    EmptyClick { weapon: usize, reload_started: bool },
    /// Fire request dropped (cooldown, reloading, no trigger press)
    FireRejected(FireRejection),
    Weapon(WeaponEvent),
    /// Shot struck level geometry
    ImpactOnSurface { point: Vec3, normal: Vec3 },
    EnemyDamaged {
        enemy: EntityId,
        info: DamageInfo,
        outcome: DamageOutcome,
    },
    EnemyStateChanged {
        enemy: EntityId,
        change: StateChange<EnemyState>,
    },
    EnemyAttackStarted { enemy: EntityId },
    EnemyAttackDodged { enemy: EntityId },
    EnemyKilled { enemy: EntityId, total_kills: u32 },
    EnemyReclaimed { enemy: EntityId },
    PlayerDamaged { info: DamageInfo, outcome: DamageOutcome },
    PlayerDied,
    PickupSpawned { pickup: EntityId, id: String, position: Vec3 },
    PickupCollected { pickup: EntityId, effect: PickupEffect },
    Door { door: EntityId, event: DoorEvent },
    DoorResponse { door: EntityId, response: DoorResponse },
    DoorUnlocked { door: EntityId },
    SwitchUsed { switch: EntityId },
    LevelStatusChanged(LevelStatus),
    LevelTransition(LevelTransition),
}

impl GameEvent {
    /// Whether this event is a kill
    pub fn is_kill(&self) -> bool {
        matches!(self, Self::EnemyKilled { .. })
    }
}
