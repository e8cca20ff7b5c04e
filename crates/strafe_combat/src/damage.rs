//! Damage kinds, hit information, and the armor absorption rule

use glam::Vec3;
use serde::{Deserialize, Serialize};
use strafe_core::EntityId;

/// Fraction of incoming damage armor soaks while any armor remains
pub const ARMOR_ABSORPTION: f32 = 0.667;

/// What dealt the damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DamageKind {
    /// Hitscan weapon round
    #[default]
    Bullet,
    /// Enemy melee strike
    Melee,
    /// Blast damage with distance falloff
    Explosion,
}

/// Information about a damage instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageInfo {
    /// Damage amount before armor
    pub amount: f32,
    /// Kind of damage
    pub kind: DamageKind,
    /// Entity that caused the damage (if any)
    pub source: Option<EntityId>,
    /// World position where damage was applied
    pub hit_point: Option<Vec3>,
    /// Surface normal at hit point
    pub hit_normal: Option<Vec3>,
}

impl DamageInfo {
    /// Create new damage info
    pub fn new(amount: f32, kind: DamageKind) -> Self {
        Self {
            amount,
            kind,
            source: None,
            hit_point: None,
            hit_normal: None,
        }
    }

    /// Set the source entity
    pub fn with_source(mut self, entity: EntityId) -> Self {
        self.source = Some(entity);
        self
    }

    /// Set the hit point and surface normal
    pub fn with_hit(mut self, point: Vec3, normal: Vec3) -> Self {
        self.hit_point = Some(point);
        self.hit_normal = Some(normal);
        self
    }
}

impl Default for DamageInfo {
    fn default() -> Self {
        Self::new(0.0, DamageKind::Bullet)
    }
}

/// How an incoming amount is divided between armor and health
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmorSplit {
    /// Armor actually removed (never more than the armor held)
    pub armor_absorbed: f32,
    /// Damage that reaches health
    pub health_damage: f32,
}

/// Split `amount` against `armor`.
///
/// Armor soaks [`ARMOR_ABSORPTION`] of the hit. When that portion is larger
/// than the armor left, armor drops to zero and the overflow is added back
/// to the health damage, so the health loss is exactly `amount - armor`.
pub fn split_armor(amount: f32, armor: f32) -> ArmorSplit {
    if armor <= 0.0 {
        return ArmorSplit {
            armor_absorbed: 0.0,
            health_damage: amount,
        };
    }

    let portion = amount * ARMOR_ABSORPTION;
    if portion > armor {
        ArmorSplit {
            armor_absorbed: armor,
            health_damage: amount - armor,
        }
    } else {
        ArmorSplit {
            armor_absorbed: portion,
            health_damage: amount - portion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_damage_info() {
        let source = EntityId::new(3, 0);
        let damage = DamageInfo::new(25.0, DamageKind::Melee)
            .with_source(source)
            .with_hit(Vec3::ONE, Vec3::Y);

        assert_eq!(damage.amount, 25.0);
        assert_eq!(damage.kind, DamageKind::Melee);
        assert_eq!(damage.source, Some(source));
        assert_eq!(damage.hit_normal, Some(Vec3::Y));
    }

    #[test]
    fn test_split_without_armor() {
        let split = split_armor(40.0, 0.0);
        assert_eq!(split.armor_absorbed, 0.0);
        assert_eq!(split.health_damage, 40.0);
    }

    #[test]
    fn test_split_partial_absorption() {
        let split = split_armor(30.0, 100.0);
        assert_relative_eq!(split.armor_absorbed, 20.01, epsilon = 1e-4);
        assert_relative_eq!(split.health_damage, 9.99, epsilon = 1e-4);
    }

    #[test]
    fn test_split_overflow_spills_into_health() {
        // 90 * 0.667 = 60.03 against 50 armor: the 10.03 overflow hits health
        let split = split_armor(90.0, 50.0);
        assert_eq!(split.armor_absorbed, 50.0);
        assert_eq!(split.health_damage, 40.0);
    }
}
