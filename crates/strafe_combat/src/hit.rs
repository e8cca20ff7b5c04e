//! Hit resolution: turning a ray or area query into damage
//!
//! A shot does one nearest-surface query. If the struck entity is
//! damageable the weapon's damage is routed to it; anything else is a
//! cosmetic impact. Area damage hits every entity in the sphere with a
//! linear falloff.

use crate::error::{check_amount, CombatResult};
use crate::health::{DamageOutcome, Vitals};
use crate::weapon::Shot;
use glam::Vec3;
use std::collections::HashMap;
use strafe_core::{
    CollisionLayer, EffectKind, EntityId, Feedback, LayerMask, PhysicsQuery, RaycastOptions,
};

/// Lookup of damageable entities by id
pub trait DamageTargets {
    /// Vitals of a damageable entity, `None` if it has none
    fn vitals_mut(&mut self, entity: EntityId) -> Option<&mut Vitals>;
}

impl DamageTargets for HashMap<EntityId, Vitals> {
    fn vitals_mut(&mut self, entity: EntityId) -> Option<&mut Vitals> {
        self.get_mut(&entity)
    }
}

/// Where a shot ended up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Nothing within range
    Miss,
    /// Struck something without vitals
    Environment { point: Vec3, normal: Vec3 },
    /// Struck and damaged a live target
    Damaged {
        entity: EntityId,
        point: Vec3,
        normal: Vec3,
        outcome: DamageOutcome,
    },
    /// Struck a target that was already dead
    Ignored { entity: EntityId, point: Vec3 },
}

impl HitOutcome {
    /// The entity killed by this hit, if any
    pub fn killed(&self) -> Option<EntityId> {
        match self {
            Self::Damaged { entity, outcome, .. } if outcome.is_kill() => Some(*entity),
            _ => None,
        }
    }
}

/// Layers a player shot can strike
pub fn shot_layers() -> LayerMask {
    LayerMask::ALL
        .without(CollisionLayer::PICKUPS)
        .without(CollisionLayer::PLAYER)
        .without(CollisionLayer::DOORWAYS)
}

/// Resolve a hitscan shot along `direction` from `origin`.
///
/// The ray is limited to the weapon's range and never hits `shooter`.
pub fn resolve_shot(
    physics: &dyn PhysicsQuery,
    targets: &mut dyn DamageTargets,
    feedback: &mut dyn Feedback,
    origin: Vec3,
    direction: Vec3,
    shot: &Shot,
    shooter: Option<EntityId>,
) -> CombatResult<HitOutcome> {
    let damage = check_amount("damage", shot.damage)?;

    let mut options = RaycastOptions::default()
        .with_max_distance(shot.range)
        .with_layers(shot_layers());
    if let Some(shooter) = shooter {
        options = options.exclude(shooter);
    }

    let Some(hit) = physics.raycast(origin, direction.normalize_or_zero(), &options) else {
        return Ok(HitOutcome::Miss);
    };

    let target = match hit.entity {
        Some(entity) => targets.vitals_mut(entity).map(|vitals| (entity, vitals)),
        None => None,
    };

    let Some((entity, vitals)) = target else {
        feedback.play_effect(EffectKind::Impact, hit.point, hit.normal);
        log::debug!("Shot hit environment at {:?}", hit.point);
        return Ok(HitOutcome::Environment {
            point: hit.point,
            normal: hit.normal,
        });
    };

    let outcome = vitals.apply_damage(damage)?;
    if outcome == DamageOutcome::Ignored {
        return Ok(HitOutcome::Ignored {
            entity,
            point: hit.point,
        });
    }

    feedback.play_effect(EffectKind::Blood, hit.point, hit.normal);
    log::debug!(
        "Shot hit {} for {:.1} ({:.1} health lost)",
        entity,
        damage,
        outcome.health_lost()
    );

    Ok(HitOutcome::Damaged {
        entity,
        point: hit.point,
        normal: hit.normal,
        outcome,
    })
}

/// Damage from a blast of `base` at `distance`; `None` outside the radius
pub fn falloff_damage(base: f32, distance: f32, radius: f32) -> Option<f32> {
    if radius <= 0.0 || distance >= radius {
        return None;
    }
    Some(base * (1.0 - distance / radius))
}

/// A spherical blast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaDamage {
    pub center: Vec3,
    pub radius: f32,
    pub base_damage: f32,
    pub layers: LayerMask,
}

impl AreaDamage {
    pub fn new(center: Vec3, radius: f32, base_damage: f32) -> Self {
        Self {
            center,
            radius,
            base_damage,
            layers: LayerMask::ALL,
        }
    }

    /// Restrict which layers the blast reaches
    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }
}

/// One target damaged by a blast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaHit {
    pub entity: EntityId,
    pub distance: f32,
    pub damage: f32,
    pub outcome: DamageOutcome,
}

/// Damage every damageable entity inside the blast independently
pub fn apply_area_damage(
    physics: &dyn PhysicsQuery,
    targets: &mut dyn DamageTargets,
    feedback: &mut dyn Feedback,
    blast: &AreaDamage,
) -> CombatResult<Vec<AreaHit>> {
    let base = check_amount("damage", blast.base_damage)?;
    feedback.play_effect(EffectKind::Explosion, blast.center, Vec3::Y);

    let mut hits = Vec::new();
    for overlap in physics.overlap_sphere(blast.center, blast.radius, blast.layers) {
        let distance = overlap.position.distance(blast.center);
        let Some(damage) = falloff_damage(base, distance, blast.radius) else {
            continue;
        };
        let Some(vitals) = targets.vitals_mut(overlap.entity) else {
            continue;
        };

        let outcome = vitals.apply_damage(damage)?;
        hits.push(AreaHit {
            entity: overlap.entity,
            distance,
            damage,
            outcome,
        });
    }

    log::debug!(
        "Blast at {:?} (r={}) damaged {} targets",
        blast.center,
        blast.radius,
        hits.len()
    );
    Ok(hits)
}
