//! Spatial query contract (raycasting, sphere overlap)
//!
//! The gameplay layer never owns collision geometry. The host's physics
//! world implements [`PhysicsQuery`]; hit resolution and interaction only
//! consume what it returns.

use crate::id::EntityId;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A collision layer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    /// Static environment layer
    pub const ENVIRONMENT: Self = Self(0);
    /// Player layer
    pub const PLAYER: Self = Self(1);
    /// Enemy layer
    pub const ENEMIES: Self = Self(2);
    /// Pickup/item layer
    pub const PICKUPS: Self = Self(3);
    /// Doors, switches and other interactables
    pub const INTERACTABLES: Self = Self(4);
    /// Open doors: still usable, but shots pass through
    pub const DOORWAYS: Self = Self(5);

    /// Get the layer as a bitmask
    #[inline]
    pub const fn as_mask(&self) -> u32 {
        1 << self.0
    }
}

impl Default for CollisionLayer {
    fn default() -> Self {
        Self::ENVIRONMENT
    }
}

/// Set of layers a query is allowed to hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Hit everything
    pub const ALL: Self = Self(u32::MAX);
    /// Hit nothing
    pub const NONE: Self = Self(0);

    /// Build a mask from a list of layers
    pub fn from_layers(layers: &[CollisionLayer]) -> Self {
        Self(layers.iter().fold(0u32, |acc, l| acc | l.as_mask()))
    }

    /// Everything except the given layer
    pub fn without(self, layer: CollisionLayer) -> Self {
        Self(self.0 & !layer.as_mask())
    }

    /// Whether the mask accepts a layer
    #[inline]
    pub fn contains(&self, layer: CollisionLayer) -> bool {
        self.0 & layer.as_mask() != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Result of a raycast query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The gameplay entity owning the struck collider, if any.
    /// `None` means static level geometry.
    pub entity: Option<EntityId>,
    /// Hit point in world space
    pub point: Vec3,
    /// Surface normal at hit point
    pub normal: Vec3,
    /// Distance from ray origin
    pub distance: f32,
    /// Layer of the struck collider
    pub layer: CollisionLayer,
}

/// Options for raycast queries
#[derive(Debug, Clone)]
pub struct RaycastOptions {
    /// Maximum distance for the ray
    pub max_distance: f32,
    /// Layers the ray may hit
    pub layers: LayerMask,
    /// Entities to ignore (usually the shooter)
    pub exclude: Vec<EntityId>,
}

impl Default for RaycastOptions {
    fn default() -> Self {
        Self {
            max_distance: f32::MAX,
            layers: LayerMask::ALL,
            exclude: Vec::new(),
        }
    }
}

impl RaycastOptions {
    /// Set maximum distance
    pub fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = distance;
        self
    }

    /// Set layer filter
    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    /// Add an entity to exclude
    pub fn exclude(mut self, entity: EntityId) -> Self {
        self.exclude.push(entity);
        self
    }

    /// Whether a candidate passes the filter
    pub fn accepts(&self, entity: Option<EntityId>, layer: CollisionLayer) -> bool {
        self.layers.contains(layer) && entity.map_or(true, |e| !self.exclude.contains(&e))
    }
}

/// One entity found by an overlap query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    /// Entity inside the query volume
    pub entity: EntityId,
    /// Entity position (used for falloff)
    pub position: Vec3,
}

/// Query interface the host physics world implements
pub trait PhysicsQuery {
    /// Cast a ray and get the nearest hit
    fn raycast(&self, origin: Vec3, direction: Vec3, options: &RaycastOptions)
        -> Option<RaycastHit>;

    /// All entities whose position lies within `radius` of `center`
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: LayerMask) -> Vec<Overlap>;
}
