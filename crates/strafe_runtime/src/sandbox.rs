//! Analytic physics world for headless runs and tests
//!
//! Colliders are spheres and infinite planes. Good enough for hitscan,
//! look rays and blast overlaps without a real physics engine.

use glam::Vec3;
use strafe_core::{
    CollisionLayer, EntityId, LayerMask, Overlap, PhysicsQuery, RaycastHit, RaycastOptions,
};

/// Collider geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { center: Vec3, radius: f32 },
    /// Solid half-space behind `normal`
    Plane { point: Vec3, normal: Vec3 },
}

/// A collider in the sandbox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub entity: Option<EntityId>,
    pub shape: Shape,
    pub layer: CollisionLayer,
}

impl Collider {
    fn origin(&self) -> Vec3 {
        match self.shape {
            Shape::Sphere { center, .. } => center,
            Shape::Plane { point, .. } => point,
        }
    }

    /// Nearest non-negative ray parameter and surface normal
    fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        match self.shape {
            Shape::Sphere { center, radius } => {
                let oc = origin - center;
                let b = oc.dot(direction);
                let c = oc.length_squared() - radius * radius;
                let discriminant = b * b - c;
                if discriminant < 0.0 {
                    return None;
                }
                let root = discriminant.sqrt();
                let t = if -b - root >= 0.0 { -b - root } else { -b + root };
                if t < 0.0 {
                    return None;
                }
                let normal = (origin + direction * t - center).normalize_or_zero();
                Some((t, normal))
            }
            Shape::Plane { point, normal } => {
                let denom = normal.dot(direction);
                if denom.abs() <= f32::EPSILON {
                    return None;
                }
                let t = (point - origin).dot(normal) / denom;
                (t >= 0.0).then_some((t, normal))
            }
        }
    }
}

/// Collection of analytic colliders answering ray and overlap queries
#[derive(Debug, Clone, Default)]
pub struct SphereWorld {
    colliders: Vec<Collider>,
}

impl SphereWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Add a sphere collider
    pub fn add_sphere(
        &mut self,
        entity: Option<EntityId>,
        center: Vec3,
        radius: f32,
        layer: CollisionLayer,
    ) {
        self.colliders.push(Collider {
            entity,
            shape: Shape::Sphere { center, radius },
            layer,
        });
    }

    /// Add a level-geometry plane
    pub fn add_plane(&mut self, point: Vec3, normal: Vec3) {
        self.colliders.push(Collider {
            entity: None,
            shape: Shape::Plane {
                point,
                normal: normal.normalize_or_zero(),
            },
            layer: CollisionLayer::ENVIRONMENT,
        });
    }

    /// Move an entity's sphere. Returns false if the entity has none.
    pub fn set_center(&mut self, entity: EntityId, position: Vec3) -> bool {
        let mut moved = false;
        for collider in self.colliders.iter_mut().filter(|c| c.entity == Some(entity)) {
            if let Shape::Sphere { center, .. } = &mut collider.shape {
                *center = position;
                moved = true;
            }
        }
        moved
    }

    /// Move an entity's colliders to another layer
    pub fn set_layer(&mut self, entity: EntityId, layer: CollisionLayer) {
        for collider in self.colliders.iter_mut().filter(|c| c.entity == Some(entity)) {
            collider.layer = layer;
        }
    }

    /// Remove every collider of an entity
    pub fn remove(&mut self, entity: EntityId) {
        self.colliders.retain(|c| c.entity != Some(entity));
    }
}

impl PhysicsQuery for SphereWorld {
    fn raycast(&self, origin: Vec3, direction: Vec3, options: &RaycastOptions) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        self.colliders
            .iter()
            .filter(|c| options.accepts(c.entity, c.layer))
            .filter_map(|c| {
                let (distance, normal) = c.intersect(origin, direction)?;
                (distance <= options.max_distance).then_some(RaycastHit {
                    entity: c.entity,
                    point: origin + direction * distance,
                    normal,
                    distance,
                    layer: c.layer,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: LayerMask) -> Vec<Overlap> {
        self.colliders
            .iter()
            .filter(|c| layers.contains(c.layer))
            .filter_map(|c| {
                let entity = c.entity?;
                let reach = match c.shape {
                    Shape::Sphere { radius: r, .. } => radius + r,
                    Shape::Plane { .. } => return None,
                };
                (c.origin().distance(center) <= reach).then_some(Overlap {
                    entity,
                    position: c.origin(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn test_raycast_nearest_sphere() {
        let mut world = SphereWorld::new();
        world.add_sphere(Some(id(1)), Vec3::new(0.0, 0.0, 10.0), 1.0, CollisionLayer::ENEMIES);
        world.add_sphere(Some(id(2)), Vec3::new(0.0, 0.0, 5.0), 1.0, CollisionLayer::ENEMIES);

        let hit = world
            .raycast(Vec3::ZERO, Vec3::Z, &RaycastOptions::default())
            .unwrap();
        assert_eq!(hit.entity, Some(id(2)));
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal.z, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_raycast_filters() {
        let mut world = SphereWorld::new();
        world.add_sphere(Some(id(1)), Vec3::new(0.0, 0.0, 3.0), 0.5, CollisionLayer::PICKUPS);
        world.add_sphere(Some(id(2)), Vec3::new(0.0, 0.0, 8.0), 0.5, CollisionLayer::ENEMIES);

        let no_pickups = RaycastOptions::default()
            .with_layers(LayerMask::ALL.without(CollisionLayer::PICKUPS));
        assert_eq!(world.raycast(Vec3::ZERO, Vec3::Z, &no_pickups).unwrap().entity, Some(id(2)));

        let short = no_pickups.clone().with_max_distance(5.0);
        assert!(world.raycast(Vec3::ZERO, Vec3::Z, &short).is_none());

        let excluded = no_pickups.exclude(id(2));
        assert!(world.raycast(Vec3::ZERO, Vec3::Z, &excluded).is_none());
    }

    #[test]
    fn test_plane_blocks_ray() {
        let mut world = SphereWorld::new();
        world.add_plane(Vec3::new(0.0, 0.0, 4.0), Vec3::NEG_Z);
        world.add_sphere(Some(id(1)), Vec3::new(0.0, 0.0, 8.0), 1.0, CollisionLayer::ENEMIES);

        let hit = world
            .raycast(Vec3::ZERO, Vec3::Z, &RaycastOptions::default())
            .unwrap();
        assert_eq!(hit.entity, None);
        assert_eq!(hit.layer, CollisionLayer::ENVIRONMENT);
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_overlap_and_move() {
        let mut world = SphereWorld::new();
        world.add_sphere(Some(id(1)), Vec3::new(3.0, 0.0, 0.0), 0.5, CollisionLayer::ENEMIES);
        world.add_sphere(Some(id(2)), Vec3::new(9.0, 0.0, 0.0), 0.5, CollisionLayer::ENEMIES);

        let found = world.overlap_sphere(Vec3::ZERO, 5.0, LayerMask::ALL);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entity, id(1));

        assert!(world.set_center(id(2), Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(world.overlap_sphere(Vec3::ZERO, 5.0, LayerMask::ALL).len(), 2);

        world.remove(id(1));
        assert_eq!(world.len(), 1);
        assert!(!world.set_center(id(1), Vec3::ZERO));
    }
}
