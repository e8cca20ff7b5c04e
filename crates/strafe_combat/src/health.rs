//! Health and armor (the damageable-entity model)

use crate::damage::split_armor;
use crate::error::{check_amount, CombatResult};
use serde::{Deserialize, Serialize};

/// Result of one damage application
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Target was already dead; nothing changed
    Ignored,
    /// Target took damage and survived
    Damaged {
        armor_absorbed: f32,
        health_lost: f32,
        remaining: f32,
    },
    /// This hit killed the target. Reported exactly once per entity.
    Killed {
        armor_absorbed: f32,
        health_lost: f32,
    },
}

impl DamageOutcome {
    /// Whether this application was the killing blow
    pub fn is_kill(&self) -> bool {
        matches!(self, Self::Killed { .. })
    }

    /// Health removed by this application
    pub fn health_lost(&self) -> f32 {
        match self {
            Self::Ignored => 0.0,
            Self::Damaged { health_lost, .. } | Self::Killed { health_lost, .. } => *health_lost,
        }
    }

    /// Armor removed by this application
    pub fn armor_absorbed(&self) -> f32 {
        match self {
            Self::Ignored => 0.0,
            Self::Damaged { armor_absorbed, .. } | Self::Killed { armor_absorbed, .. } => {
                *armor_absorbed
            }
        }
    }
}

/// Health/armor pool for anything that can be shot.
///
/// Invariants: `0 <= health <= max_health`, `0 <= armor <= max_armor`.
/// Once dead, neither damage nor healing changes anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    health: f32,
    max_health: f32,
    armor: f32,
    max_armor: f32,
    alive: bool,
}

impl Vitals {
    /// Spawn with full health and no armor capacity
    pub fn new(max_health: f32) -> Self {
        let max_health = max_health.max(0.0);
        Self {
            health: max_health,
            max_health,
            armor: 0.0,
            max_armor: 0.0,
            alive: max_health > 0.0,
        }
    }

    /// Set starting armor and armor capacity
    pub fn with_armor(mut self, armor: f32, max_armor: f32) -> Self {
        self.max_armor = max_armor.max(0.0);
        self.armor = armor.clamp(0.0, self.max_armor);
        self
    }

    /// Apply damage through the armor rule.
    ///
    /// Dead targets return [`DamageOutcome::Ignored`]. Negative or
    /// non-finite amounts are rejected without touching state.
    pub fn apply_damage(&mut self, amount: f32) -> CombatResult<DamageOutcome> {
        let amount = check_amount("damage", amount)?;
        if !self.alive {
            return Ok(DamageOutcome::Ignored);
        }

        let split = split_armor(amount, self.armor);
        self.armor = (self.armor - split.armor_absorbed).max(0.0);

        let before = self.health;
        self.health = (self.health - split.health_damage).max(0.0);
        let health_lost = before - self.health;

        if self.health <= 0.0 {
            self.alive = false;
            return Ok(DamageOutcome::Killed {
                armor_absorbed: split.armor_absorbed,
                health_lost,
            });
        }

        Ok(DamageOutcome::Damaged {
            armor_absorbed: split.armor_absorbed,
            health_lost,
            remaining: self.health,
        })
    }

    /// Heal, clamped to max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> CombatResult<f32> {
        let amount = check_amount("heal", amount)?;
        if !self.alive {
            return Ok(0.0);
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        Ok(self.health - before)
    }

    /// Add armor, clamped to max. Returns the amount actually added.
    pub fn add_armor(&mut self, amount: f32) -> CombatResult<f32> {
        let amount = check_amount("armor", amount)?;
        if !self.alive {
            return Ok(0.0);
        }
        let before = self.armor;
        self.armor = (self.armor + amount).min(self.max_armor);
        Ok(self.armor - before)
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn armor(&self) -> f32 {
        self.armor
    }

    pub fn max_armor(&self) -> f32 {
        self.max_armor
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Below max health (health pickups only apply then)
    pub fn is_hurt(&self) -> bool {
        self.health < self.max_health
    }

    /// Below max armor (armor pickups only apply then)
    pub fn can_take_armor(&self) -> bool {
        self.armor < self.max_armor
    }

    /// Get health as a fraction (0.0 - 1.0)
    pub fn health_percent(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }

    /// Get armor as a fraction (0.0 - 1.0)
    pub fn armor_percent(&self) -> f32 {
        if self.max_armor <= 0.0 {
            return 0.0;
        }
        self.armor / self.max_armor
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self::new(100.0)
    }
}
