//! Shared entity data.
//!
//! Components are pure data with no behavior beyond small invariant-keeping
//! helpers. Agents embed these rather than inheriting from each other; all
//! cross-entity references are bare [`EntityId`]s re-validated by lookup in
//! the owning collection every tick.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Unique identifier for entities.
///
/// Ids are allocated from a single zone-wide counter and never reused, so a
/// stale reference can only ever miss - it can never alias a newer entity.
pub type EntityId = u64;

/// Tradeable resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Refined ore, produced by mining stations.
    Materials,
    /// Grown produce, produced by agricultural stations.
    Food,
}

impl Resource {
    /// All resource kinds, in stable order.
    pub const ALL: [Self; 2] = [Self::Materials, Self::Food];

    /// Base price in credits per unit, before scarcity adjustment.
    #[must_use]
    pub const fn base_price(self) -> i64 {
        match self {
            Self::Materials => 45,
            Self::Food => 18,
        }
    }

    /// Stable name for logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Materials => "materials",
            Self::Food => "food",
        }
    }
}

/// Position, velocity and speed cap for a mobile entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// World position.
    pub position: Vec2,
    /// Current velocity (units per second).
    pub velocity: Vec2,
    /// Velocity magnitude cap.
    pub max_speed: f32,
}

impl Body {
    /// Create a body at rest.
    #[must_use]
    pub const fn new(position: Vec2, max_speed: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            max_speed,
        }
    }

    /// Distance to a point.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }
}

/// Hull integrity for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Current hull points.
    pub hull: i32,
    /// Maximum hull points.
    pub max_hull: i32,
}

impl Health {
    /// Create new health at full hull.
    #[must_use]
    pub const fn new(max_hull: i32) -> Self {
        Self {
            hull: max_hull,
            max_hull,
        }
    }

    /// Check if the entity is destroyed.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.hull <= 0
    }

    /// Hull as a fraction of maximum in [0, 1].
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max_hull <= 0 {
            return 0.0;
        }
        (self.hull.max(0) as f32) / (self.max_hull as f32)
    }

    /// Apply damage. Returns true iff the entity died from this hit.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.hull -= amount;
        self.hull <= 0
    }

    /// Heal up to the hull cap. Returns the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let headroom = (self.max_hull - self.hull).max(0);
        let restored = amount.min(headroom);
        self.hull += restored;
        restored
    }
}

/// Per-resource cargo hold with a shared capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cargo {
    /// Total unit capacity across all resources.
    pub capacity: u32,
    /// Carried materials.
    pub materials: u32,
    /// Carried food.
    pub food: u32,
}

impl Cargo {
    /// Create an empty hold.
    #[must_use]
    pub const fn new(capacity: u32) -> Self {
        Self {
            capacity,
            materials: 0,
            food: 0,
        }
    }

    /// Units carried in total.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.materials + self.food
    }

    /// Free space remaining.
    #[must_use]
    pub const fn space(&self) -> u32 {
        self.capacity.saturating_sub(self.total())
    }

    /// Check if the hold is full.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.space() == 0
    }

    /// Units of one resource carried.
    #[must_use]
    pub const fn amount(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Materials => self.materials,
            Resource::Food => self.food,
        }
    }

    /// Load units, respecting capacity. Returns the amount actually loaded.
    pub fn load(&mut self, resource: Resource, amount: u32) -> u32 {
        let loaded = amount.min(self.space());
        match resource {
            Resource::Materials => self.materials += loaded,
            Resource::Food => self.food += loaded,
        }
        loaded
    }

    /// Unload units. Returns the amount actually unloaded.
    pub fn unload(&mut self, resource: Resource, amount: u32) -> u32 {
        let held = self.amount(resource);
        let unloaded = amount.min(held);
        match resource {
            Resource::Materials => self.materials -= unloaded,
            Resource::Food => self.food -= unloaded,
        }
        unloaded
    }
}

/// Lifetime of a distress beacon in seconds.
pub const BEACON_TTL: f32 = 30.0;

/// A transient world marker that attracts police response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistressBeacon {
    /// Beacon entity id.
    pub id: EntityId,
    /// World position.
    pub position: Vec2,
    /// Remaining time to live in seconds.
    pub ttl: f32,
    /// Whether a police ship has already reached this beacon.
    pub responded: bool,
    /// Entity that raised it.
    pub source: EntityId,
}

impl DistressBeacon {
    /// Raise a new beacon at a position.
    #[must_use]
    pub const fn new(id: EntityId, position: Vec2, source: EntityId) -> Self {
        Self {
            id,
            position,
            ttl: BEACON_TTL,
            responded: false,
            source,
        }
    }

    /// Count down the lifetime. Returns true while the beacon is still live.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.ttl -= dt;
        self.ttl > 0.0
    }
}

/// A minable rock. Remaining ore doubles as its health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    /// Asteroid entity id.
    pub id: EntityId,
    /// World position (asteroids do not move).
    pub position: Vec2,
    /// Remaining ore units.
    pub ore: u32,
}

impl Asteroid {
    /// Check if the asteroid is mined out.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.ore == 0
    }

    /// Extract ore. Returns the amount actually extracted.
    pub fn extract(&mut self, amount: u32) -> u32 {
        let extracted = amount.min(self.ore);
        self.ore -= extracted;
        extracted
    }
}

/// A static jump gate, used as a cruise waypoint by friendly traffic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// Gate entity id.
    pub id: EntityId,
    /// World position.
    pub position: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage_and_death() {
        let mut health = Health::new(30);
        assert!(!health.take_damage(10));
        assert_eq!(health.hull, 20);
        assert!(!health.is_dead());

        // Killing blow reports death exactly once at the crossing
        assert!(health.take_damage(25));
        assert!(health.is_dead());
    }

    #[test]
    fn test_health_fraction() {
        let mut health = Health::new(100);
        health.take_damage(60);
        assert!((health.fraction() - 0.4).abs() < 1e-6);

        health.take_damage(1000);
        assert_eq!(health.fraction(), 0.0);
    }

    #[test]
    fn test_health_heal_caps_at_max() {
        let mut health = Health::new(50);
        health.take_damage(20);
        assert_eq!(health.heal(100), 20);
        assert_eq!(health.hull, 50);
    }

    #[test]
    fn test_cargo_load_unload() {
        let mut cargo = Cargo::new(20);
        assert_eq!(cargo.load(Resource::Materials, 15), 15);
        assert_eq!(cargo.load(Resource::Food, 10), 5); // only 5 space left
        assert!(cargo.is_full());

        assert_eq!(cargo.unload(Resource::Materials, 20), 15);
        assert_eq!(cargo.amount(Resource::Materials), 0);
        assert_eq!(cargo.total(), 5);
    }

    #[test]
    fn test_beacon_expiry() {
        let mut beacon = DistressBeacon::new(1, Vec2::ZERO, 2);
        assert!(beacon.tick(10.0));
        assert!(beacon.tick(19.0));
        assert!(!beacon.tick(2.0));
    }

    #[test]
    fn test_asteroid_extract() {
        let mut asteroid = Asteroid {
            id: 1,
            position: Vec2::ZERO,
            ore: 3,
        };
        assert_eq!(asteroid.extract(1), 1);
        assert_eq!(asteroid.extract(5), 2);
        assert!(asteroid.is_depleted());
    }
}
