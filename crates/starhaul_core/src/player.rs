//! The player-controlled ship.
//!
//! The player is the only agent that consults input: a [`PlayerIntent`]
//! written by the embedding layer before each tick. Damage drains the
//! shield before the hull; energy gates the weapons; shield and energy
//! regenerate in the orchestrator's end-of-tick regen step.

use crate::combat::{Projectile, HOMING_DETECTION_RANGE, MISSILE_TURN_RATE};
use crate::components::{Body, EntityId, Health};
use crate::math::Vec2;
use crate::movement;
use crate::ships::PLAYER_SPEC;

/// Shield points at spawn.
pub const MAX_SHIELD: i32 = 50;

/// Seconds without damage before the shield recharges.
const SHIELD_REGEN_DELAY: f32 = 3.0;

/// Shield points regenerated per second.
const SHIELD_REGEN_RATE: f32 = 4.0;

/// Energy pool cap.
pub const MAX_ENERGY: f32 = 100.0;

/// Energy regenerated per second.
const ENERGY_REGEN_RATE: f32 = 20.0;

/// Blaster energy cost per shot.
const BLASTER_COST: f32 = 5.0;

/// Blaster projectile flight time.
const BLASTER_LIFETIME: f32 = 1.5;

/// Missile energy cost per shot.
const MISSILE_COST: f32 = 20.0;

/// Seconds between missile launches.
const MISSILE_COOLDOWN: f32 = 2.5;

/// Missile damage.
const MISSILE_DAMAGE: i32 = 20;

/// Missile speed. Slower than a blaster bolt so the turn-rate cap matters.
const MISSILE_SPEED: f32 = 300.0;

/// Missile flight time.
const MISSILE_LIFETIME: f32 = 4.0;

/// Splash cannon energy cost per shot.
const CANNON_COST: f32 = 15.0;

/// Seconds between cannon shots.
const CANNON_COOLDOWN: f32 = 1.8;

/// Cannon direct damage.
const CANNON_DAMAGE: i32 = 15;

/// Cannon projectile speed.
const CANNON_SPEED: f32 = 380.0;

/// Cannon blast radius.
const CANNON_SPLASH_RADIUS: f32 = 60.0;

/// Cannon splash damage.
const CANNON_SPLASH_DAMAGE: i32 = 7;

/// Thrust acceleration as a multiple of the speed cap, per second.
const THRUST_ACCEL: f32 = 4.0;

/// Per-tick control input from the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerIntent {
    /// Thrust direction; clamped to unit length.
    pub thrust: Vec2,
    /// Weapon heading in radians. Falls back to the travel heading.
    pub aim: Option<f32>,
    /// Fire the blaster this tick.
    pub fire_blaster: bool,
    /// Launch a homing missile this tick.
    pub fire_missile: bool,
    /// Fire the splash cannon this tick.
    pub fire_cannon: bool,
}

/// The player's ship.
#[derive(Debug, Clone)]
pub struct PlayerShip {
    /// Entity id.
    pub id: EntityId,
    /// Position/velocity/speed cap.
    pub body: Body,
    /// Hull.
    pub health: Health,
    /// Shield points; absorb damage before the hull.
    pub shield: i32,
    /// Shield cap.
    pub max_shield: i32,
    /// Weapon energy pool.
    pub energy: f32,
    /// Energy cap.
    pub max_energy: f32,
    /// Credit balance (bounties accumulate here).
    pub credits: i64,
    /// Seconds until the blaster may fire.
    pub blaster_cooldown: f32,
    /// Seconds until the next missile.
    pub missile_cooldown: f32,
    /// Seconds until the next cannon shot.
    pub cannon_cooldown: f32,
    /// Seconds since the last hit taken.
    pub since_damage: f32,
    /// Sub-point shield regen remainder.
    shield_fraction: f32,
}

impl PlayerShip {
    /// Create the player ship at a position.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2) -> Self {
        Self {
            id,
            body: Body::new(position, PLAYER_SPEC.max_speed),
            health: Health::new(PLAYER_SPEC.max_hull),
            shield: MAX_SHIELD,
            max_shield: MAX_SHIELD,
            energy: MAX_ENERGY,
            max_energy: MAX_ENERGY,
            credits: 0,
            blaster_cooldown: 0.0,
            missile_cooldown: 0.0,
            cannon_cooldown: 0.0,
            since_damage: SHIELD_REGEN_DELAY,
            shield_fraction: 0.0,
        }
    }

    /// Apply incoming damage, shield first.
    ///
    /// Returns `(shield_absorbed, hull_damage, died)`.
    pub fn take_damage(&mut self, amount: i32) -> (i32, i32, bool) {
        self.since_damage = 0.0;
        let absorbed = amount.min(self.shield);
        self.shield -= absorbed;
        let hull_damage = amount - absorbed;
        let died = if hull_damage > 0 {
            self.health.take_damage(hull_damage)
        } else {
            false
        };
        (absorbed, hull_damage, died)
    }

    /// Movement, regen and weapons for one tick. New shots are appended
    /// to `projectiles`.
    pub fn update(
        &mut self,
        intent: &PlayerIntent,
        dt: f32,
        next_id: &mut EntityId,
        projectiles: &mut Vec<Projectile>,
    ) {
        self.blaster_cooldown = (self.blaster_cooldown - dt).max(0.0);
        self.missile_cooldown = (self.missile_cooldown - dt).max(0.0);
        self.cannon_cooldown = (self.cannon_cooldown - dt).max(0.0);
        self.since_damage += dt;

        self.energy = (self.energy + ENERGY_REGEN_RATE * dt).min(self.max_energy);

        if self.since_damage >= SHIELD_REGEN_DELAY && self.shield < self.max_shield {
            self.shield_fraction += SHIELD_REGEN_RATE * dt;
            let whole = self.shield_fraction.floor();
            self.shield = (self.shield + whole as i32).min(self.max_shield);
            self.shield_fraction -= whole;
        }

        let thrust = intent.thrust.clamp_length(1.0);
        self.body.velocity += thrust * (self.body.max_speed * THRUST_ACCEL * dt);
        movement::integrate(&mut self.body, dt, 1.0);

        let aim = intent.aim.unwrap_or_else(|| {
            if self.body.velocity.length_squared() > f32::EPSILON {
                self.body.velocity.angle()
            } else {
                0.0
            }
        });

        if intent.fire_blaster && self.blaster_cooldown <= 0.0 && self.energy >= BLASTER_COST {
            self.energy -= BLASTER_COST;
            self.blaster_cooldown = PLAYER_SPEC.fire_cooldown;
            let id = *next_id;
            *next_id += 1;
            projectiles.push(Projectile::new(
                id,
                self.id,
                self.body.position,
                aim,
                PLAYER_SPEC.projectile_speed,
                BLASTER_LIFETIME,
                PLAYER_SPEC.projectile_damage,
                false,
            ));
        }

        if intent.fire_missile && self.missile_cooldown <= 0.0 && self.energy >= MISSILE_COST {
            self.energy -= MISSILE_COST;
            self.missile_cooldown = MISSILE_COOLDOWN;
            let id = *next_id;
            *next_id += 1;
            projectiles.push(
                Projectile::new(
                    id,
                    self.id,
                    self.body.position,
                    aim,
                    MISSILE_SPEED,
                    MISSILE_LIFETIME,
                    MISSILE_DAMAGE,
                    false,
                )
                .with_homing(MISSILE_TURN_RATE, HOMING_DETECTION_RANGE),
            );
        }

        if intent.fire_cannon && self.cannon_cooldown <= 0.0 && self.energy >= CANNON_COST {
            self.energy -= CANNON_COST;
            self.cannon_cooldown = CANNON_COOLDOWN;
            let id = *next_id;
            *next_id += 1;
            projectiles.push(
                Projectile::new(
                    id,
                    self.id,
                    self.body.position,
                    aim,
                    CANNON_SPEED,
                    BLASTER_LIFETIME,
                    CANNON_DAMAGE,
                    false,
                )
                .with_splash(CANNON_SPLASH_RADIUS, CANNON_SPLASH_DAMAGE),
            );
        }
    }
}
