//! Projectile simulation and collision resolution.
//!
//! Projectiles are integrated, expired, homed and collided here; the
//! orchestrator applies the resulting [`Impact`]s to the owning
//! collections so damage, deaths and rewards happen in one place.
//!
//! Collision is a flat distance threshold against a snapshot of candidate
//! targets. A projectile that expires on a tick does not also collide on
//! that tick.

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::math::Vec2;

/// Distance within which a projectile registers a hit.
pub const HIT_RADIUS: f32 = 18.0;

/// Homing acquisition radius.
pub const HOMING_DETECTION_RANGE: f32 = 300.0;

/// Missile turn-rate cap in radians per second.
pub const MISSILE_TURN_RATE: f32 = 3.5;

/// Homing guidance state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homing {
    /// Current lock, re-validated against the live snapshot every tick.
    pub target: Option<EntityId>,
    /// Turn-rate cap in radians per second.
    pub turn_rate: f32,
    /// Acquisition radius.
    pub detection_range: f32,
}

/// Splash payload applied around the impact point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Splash {
    /// Blast radius.
    pub radius: f32,
    /// Damage dealt to each secondary target.
    pub damage: i32,
}

/// A projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Projectile entity id.
    pub id: EntityId,
    /// Entity that fired this projectile.
    pub source: EntityId,
    /// World position.
    pub position: Vec2,
    /// Velocity (units/s).
    pub velocity: Vec2,
    /// Remaining flight time in seconds.
    pub lifetime: f32,
    /// Damage on direct hit.
    pub damage: i32,
    /// True when fired by pirates (collides with the player's side).
    pub hostile: bool,
    /// Optional homing guidance.
    pub homing: Option<Homing>,
    /// Optional splash payload.
    pub splash: Option<Splash>,
}

impl Projectile {
    /// Spawn a projectile heading along `angle` radians.
    #[must_use]
    pub fn new(
        id: EntityId,
        source: EntityId,
        position: Vec2,
        angle: f32,
        speed: f32,
        lifetime: f32,
        damage: i32,
        hostile: bool,
    ) -> Self {
        Self {
            id,
            source,
            position,
            velocity: Vec2::from_angle(angle) * speed,
            lifetime,
            damage,
            hostile,
            homing: None,
            splash: None,
        }
    }

    /// Builder: make this projectile home on targets.
    #[must_use]
    pub const fn with_homing(mut self, turn_rate: f32, detection_range: f32) -> Self {
        self.homing = Some(Homing {
            target: None,
            turn_rate,
            detection_range,
        });
        self
    }

    /// Builder: add a splash payload.
    #[must_use]
    pub const fn with_splash(mut self, radius: f32, damage: i32) -> Self {
        self.splash = Some(Splash { radius, damage });
        self
    }

    /// Integrate one tick. Returns false once the lifetime has run out.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.position += self.velocity * dt;
        self.lifetime -= dt;
        self.lifetime > 0.0
    }
}

/// Positional snapshot of a collision candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRef {
    /// Candidate entity id.
    pub id: EntityId,
    /// Candidate position this tick.
    pub position: Vec2,
}

/// The outcome of a projectile strike.
#[derive(Debug, Clone, PartialEq)]
pub struct Impact {
    /// The projectile that hit (already removed from the collection).
    pub projectile: EntityId,
    /// Entity that fired the projectile.
    pub source: EntityId,
    /// Direct-hit target.
    pub target: EntityId,
    /// Direct damage.
    pub damage: i32,
    /// Impact point, for splash and effects.
    pub position: Vec2,
    /// Secondary targets caught in the splash, with the splash damage.
    pub splash_hits: Vec<(EntityId, i32)>,
}

/// Advance, home and collide every projectile.
///
/// `player_side` are the candidates for hostile projectiles (player,
/// traders, miners, freighters, police); `pirate_side` the candidates for
/// friendly fire (pirates). Expired and hit projectiles are removed.
pub fn projectile_system(
    projectiles: &mut Vec<Projectile>,
    dt: f32,
    player_side: &[TargetRef],
    pirate_side: &[TargetRef],
) -> Vec<Impact> {
    let mut impacts = Vec::new();

    projectiles.retain_mut(|projectile| {
        // Expiry first: a projectile removed this tick takes no part in
        // collision checks.
        if !projectile.advance(dt) {
            return false;
        }

        let candidates = if projectile.hostile {
            player_side
        } else {
            pirate_side
        };

        if let Some(homing) = projectile.homing.as_mut() {
            steer_homing(
                homing,
                &mut projectile.velocity,
                projectile.position,
                candidates,
                dt,
            );
        }

        let hit = candidates
            .iter()
            .map(|t| (t, projectile.position.distance_squared(t.position)))
            .filter(|(_, d2)| *d2 <= HIT_RADIUS * HIT_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(t, _)| *t);

        if let Some(target) = hit {
            let splash_hits = match projectile.splash {
                Some(splash) => candidates
                    .iter()
                    .filter(|t| t.id != target.id)
                    .filter(|t| {
                        projectile.position.distance_squared(t.position)
                            <= splash.radius * splash.radius
                    })
                    .map(|t| (t.id, splash.damage))
                    .collect(),
                None => Vec::new(),
            };
            impacts.push(Impact {
                projectile: projectile.id,
                source: projectile.source,
                target: target.id,
                damage: projectile.damage,
                position: projectile.position,
                splash_hits,
            });
            return false;
        }

        true
    });

    impacts
}

/// Re-validate the lock, acquire if needed, and turn toward the target.
fn steer_homing(
    homing: &mut Homing,
    velocity: &mut Vec2,
    position: Vec2,
    candidates: &[TargetRef],
    dt: f32,
) {
    // A lock on a removed entity is dropped, never dereferenced
    let lock_alive = homing
        .target
        .is_some_and(|id| candidates.iter().any(|t| t.id == id));
    if !lock_alive {
        homing.target = candidates
            .iter()
            .map(|t| (t.id, position.distance_squared(t.position)))
            .filter(|(_, d2)| *d2 <= homing.detection_range * homing.detection_range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);
    }

    if let Some(target_id) = homing.target {
        if let Some(target) = candidates.iter().find(|t| t.id == target_id) {
            let to_target = target.position - position;
            *velocity = velocity.rotate_towards(to_target, homing.turn_rate * dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_shot(position: Vec2, angle: f32, hostile: bool) -> Projectile {
        Projectile::new(1, 0, position, angle, 100.0, 2.0, 8, hostile)
    }

    #[test]
    fn test_expiry_tick_skips_collision() {
        let mut projectiles = vec![Projectile::new(1, 0, Vec2::ZERO, 0.0, 0.0, 2.0, 8, false)];

        // 1.5 seconds elapse with nothing in range
        let impacts = projectile_system(&mut projectiles, 1.5, &[], &[]);
        assert!(impacts.is_empty());
        assert_eq!(projectiles.len(), 1);

        // Lifetime reaches exactly 0 this tick while overlapping a
        // target: removal wins, no hit is scored.
        let targets = [TargetRef {
            id: 9,
            position: Vec2::ZERO,
        }];
        let impacts = projectile_system(&mut projectiles, 0.5, &[], &targets);
        assert!(impacts.is_empty());
        assert!(projectiles.is_empty());
    }

    #[test]
    fn test_direct_hit_removes_projectile() {
        let mut projectiles = vec![plain_shot(Vec2::ZERO, 0.0, false)];
        let targets = [TargetRef {
            id: 9,
            position: Vec2::new(10.0, 0.0),
        }];

        let impacts = projectile_system(&mut projectiles, 0.05, &[], &targets);
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].target, 9);
        assert_eq!(impacts[0].damage, 8);
        assert!(projectiles.is_empty());
    }

    #[test]
    fn test_faction_filtering() {
        // Hostile projectile ignores the pirate population entirely
        let mut projectiles = vec![plain_shot(Vec2::ZERO, 0.0, true)];
        let pirates = [TargetRef {
            id: 5,
            position: Vec2::new(5.0, 0.0),
        }];

        let impacts = projectile_system(&mut projectiles, 0.05, &[], &pirates);
        assert!(impacts.is_empty());
        assert_eq!(projectiles.len(), 1);
    }

    #[test]
    fn test_nearest_candidate_takes_the_hit() {
        let mut projectiles = vec![plain_shot(Vec2::ZERO, 0.0, false)];
        let targets = [
            TargetRef {
                id: 9,
                position: Vec2::new(12.0, 0.0),
            },
            TargetRef {
                id: 10,
                position: Vec2::new(6.0, 0.0),
            },
        ];

        let impacts = projectile_system(&mut projectiles, 0.01, &[], &targets);
        assert_eq!(impacts[0].target, 10);
    }

    #[test]
    fn test_splash_spares_the_direct_target() {
        let mut projectiles =
            vec![plain_shot(Vec2::ZERO, 0.0, false).with_splash(60.0, 7)];
        let targets = [
            TargetRef {
                id: 9,
                position: Vec2::new(4.0, 0.0),
            },
            TargetRef {
                id: 10,
                position: Vec2::new(40.0, 0.0),
            },
            TargetRef {
                id: 11,
                position: Vec2::new(500.0, 0.0),
            },
        ];

        let impacts = projectile_system(&mut projectiles, 0.01, &[], &targets);
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].splash_hits, vec![(10, 7)]);
    }

    #[test]
    fn test_homing_acquires_and_turns() {
        let mut projectiles = vec![Projectile::new(1, 0, Vec2::ZERO, 0.0, 100.0, 5.0, 20, false)
            .with_homing(MISSILE_TURN_RATE, HOMING_DETECTION_RANGE)];
        // Target above the flight path
        let targets = [TargetRef {
            id: 9,
            position: Vec2::new(50.0, 120.0),
        }];

        let impacts = projectile_system(&mut projectiles, 0.05, &[], &targets);
        assert!(impacts.is_empty());
        let p = &projectiles[0];
        assert_eq!(p.homing.unwrap().target, Some(9));
        // Heading bent upward, speed preserved
        assert!(p.velocity.y > 0.0);
        assert!((p.velocity.length() - 100.0).abs() < 1e-3);
        // Turn was capped, not instant
        assert!(p.velocity.angle() <= MISSILE_TURN_RATE * 0.05 + 1e-4);
    }

    #[test]
    fn test_homing_drops_stale_lock() {
        let mut projectiles = vec![Projectile::new(1, 0, Vec2::ZERO, 0.0, 100.0, 5.0, 20, false)
            .with_homing(MISSILE_TURN_RATE, HOMING_DETECTION_RANGE)];
        let first = [TargetRef {
            id: 9,
            position: Vec2::new(100.0, 0.0),
        }];
        projectile_system(&mut projectiles, 0.01, &[], &first);
        assert_eq!(projectiles[0].homing.unwrap().target, Some(9));

        // Target 9 died; a different pirate is in range
        let second = [TargetRef {
            id: 12,
            position: Vec2::new(120.0, 20.0),
        }];
        projectile_system(&mut projectiles, 0.01, &[], &second);
        assert_eq!(projectiles[0].homing.unwrap().target, Some(12));
    }

    #[test]
    fn test_homing_out_of_range_flies_straight() {
        let mut projectiles = vec![Projectile::new(1, 0, Vec2::ZERO, 0.0, 100.0, 5.0, 20, false)
            .with_homing(MISSILE_TURN_RATE, 50.0)];
        let targets = [TargetRef {
            id: 9,
            position: Vec2::new(0.0, 400.0),
        }];

        projectile_system(&mut projectiles, 0.05, &[], &targets);
        assert_eq!(projectiles[0].homing.unwrap().target, None);
        assert_eq!(projectiles[0].velocity.angle(), 0.0);
    }
}
