//! Pirate raider state machine.
//!
//! Pirates hunt the player and undocked civilian traffic, hold a
//! stand-off range while attacking, and break off when hurt or when
//! police close in.

use rand::Rng;

use crate::combat::{Projectile, TargetRef};
use crate::components::{Body, EntityId, Health};
use crate::events::ZoneEvent;
use crate::math::Vec2;
use crate::movement;
use crate::ships::{ShipClass, PIRATE_SPEC};

/// Hull fraction below which a pirate disengages.
pub const FLEE_HULL_FRACTION: f32 = 0.4;

/// Hull fraction a fleeing pirate must recover before re-engaging.
pub const REENGAGE_HULL_FRACTION: f32 = 0.7;

/// Police distance that forces a pirate to break off.
pub const POLICE_SCARE_RANGE: f32 = 150.0;

/// Hull regenerated per second while fleeing.
const FLEE_REGEN_RATE: f32 = 2.0;

/// Patrol radius around the pirate's home anchor.
const PATROL_RADIUS: f32 = 350.0;

/// Projectile flight time.
const SHOT_LIFETIME: f32 = 1.5;

/// Pirate behavior states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PirateState {
    /// Scanning for prey, chasing or patrolling.
    Hunt,
    /// Holding stand-off range and firing.
    Attack,
    /// Running from police while hull recovers.
    Flee,
}

impl PirateState {
    /// Stable name for AI-decision events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hunt => "hunt",
            Self::Attack => "attack",
            Self::Flee => "flee",
        }
    }
}

/// A pirate raider.
#[derive(Debug, Clone)]
pub struct Pirate {
    /// Entity id.
    pub id: EntityId,
    /// Position/velocity/speed cap.
    pub body: Body,
    /// Hull.
    pub health: Health,
    /// Current behavior state.
    pub state: PirateState,
    /// Current prey, validated against the live snapshot each tick.
    pub target: Option<EntityId>,
    /// Seconds until the next shot.
    pub fire_cooldown: f32,
    /// Seconds spent in the current state.
    pub state_timer: f32,
    /// Patrol waypoint.
    pub waypoint: Vec2,
    /// Patrol anchor (usually the spawning pirate station).
    pub home: Vec2,
    /// Sub-point regen remainder while fleeing.
    regen_fraction: f32,
}

impl Pirate {
    /// Create a pirate at a position.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, max_speed: f32, hull: i32) -> Self {
        Self {
            id,
            body: Body::new(position, max_speed),
            health: Health {
                hull,
                max_hull: hull,
            },
            state: PirateState::Hunt,
            target: None,
            fire_cooldown: 0.0,
            state_timer: 0.0,
            waypoint: position,
            home: position,
            regen_fraction: 0.0,
        }
    }

    fn set_state(&mut self, state: PirateState, events: &mut Vec<ZoneEvent>) {
        if self.state != state {
            self.state = state;
            self.state_timer = 0.0;
            events.push(ZoneEvent::StateChanged {
                ship: self.id,
                class: ShipClass::Pirate,
                state: state.name(),
            });
        }
    }
}

fn nearest(position: Vec2, contacts: &[TargetRef]) -> Option<(EntityId, Vec2, f32)> {
    contacts
        .iter()
        .map(|c| (c.id, c.position, position.distance(c.position)))
        .min_by(|a, b| a.2.total_cmp(&b.2))
}

fn contact_position(contacts: &[TargetRef], id: EntityId) -> Option<Vec2> {
    contacts.iter().find(|c| c.id == id).map(|c| c.position)
}

/// Advance every pirate by one tick.
///
/// `prey` holds the player and every undocked trader/miner/freighter;
/// `police` holds police ship positions. New shots are appended to
/// `projectiles`.
pub fn pirate_system<R: Rng>(
    pirates: &mut [Pirate],
    prey: &[TargetRef],
    police: &[TargetRef],
    dt: f32,
    rng: &mut R,
    next_id: &mut EntityId,
    projectiles: &mut Vec<Projectile>,
    events: &mut Vec<ZoneEvent>,
) {
    for pirate in pirates.iter_mut() {
        pirate.state_timer += dt;
        pirate.fire_cooldown = (pirate.fire_cooldown - dt).max(0.0);

        // Liveness: anything but the default state resets after the
        // class timeout.
        if pirate.state != PirateState::Hunt && pirate.state_timer > PIRATE_SPEC.state_timeout {
            pirate.target = None;
            pirate.set_state(PirateState::Hunt, events);
        }

        let police_contact = nearest(pirate.body.position, police);
        let police_nearby = police_contact.is_some_and(|(_, _, d)| d <= POLICE_SCARE_RANGE);

        let mut speed_mult = 1.0;
        match pirate.state {
            PirateState::Hunt => {
                match nearest(pirate.body.position, prey)
                    .filter(|(_, _, d)| *d <= PIRATE_SPEC.detection_range)
                {
                    Some((id, position, dist)) => {
                        pirate.target = Some(id);
                        movement::seek(&mut pirate.body, position, dt);
                        if dist <= PIRATE_SPEC.attack_range {
                            pirate.set_state(PirateState::Attack, events);
                        }
                    }
                    None => {
                        pirate.target = None;
                        movement::patrol(
                            &mut pirate.body,
                            &mut pirate.waypoint,
                            pirate.home,
                            PATROL_RADIUS,
                            dt,
                            rng,
                        );
                    }
                }
            }

            PirateState::Attack => {
                // Stale prey resets the same tick, before any shot
                let target_pos = pirate.target.and_then(|id| contact_position(prey, id));
                let Some(target_pos) = target_pos else {
                    pirate.target = None;
                    pirate.set_state(PirateState::Hunt, events);
                    movement::integrate(&mut pirate.body, dt, 1.0);
                    continue;
                };

                if pirate.health.fraction() < FLEE_HULL_FRACTION || police_nearby {
                    pirate.set_state(PirateState::Flee, events);
                    movement::integrate(&mut pirate.body, dt, 1.0);
                    continue;
                }

                let dist = pirate.body.distance_to(target_pos);
                if dist > PIRATE_SPEC.attack_range * 1.5 {
                    pirate.target = None;
                    pirate.set_state(PirateState::Hunt, events);
                    movement::integrate(&mut pirate.body, dt, 1.0);
                    continue;
                }

                // Hold the stand-off band
                if dist < PIRATE_SPEC.optimal_range {
                    movement::move_away(&mut pirate.body, target_pos, dt, 1.0);
                } else if dist > PIRATE_SPEC.optimal_range * 1.3 {
                    movement::seek(&mut pirate.body, target_pos, dt);
                } else {
                    movement::circle_strafe(&mut pirate.body, target_pos, dt);
                }

                if pirate.fire_cooldown <= 0.0 && dist <= PIRATE_SPEC.attack_range {
                    let angle = (target_pos - pirate.body.position).angle();
                    let id = *next_id;
                    *next_id += 1;
                    projectiles.push(Projectile::new(
                        id,
                        pirate.id,
                        pirate.body.position,
                        angle,
                        PIRATE_SPEC.projectile_speed,
                        SHOT_LIFETIME,
                        PIRATE_SPEC.projectile_damage,
                        true,
                    ));
                    pirate.fire_cooldown = PIRATE_SPEC.fire_cooldown;
                }
            }

            PirateState::Flee => {
                speed_mult = PIRATE_SPEC.flee_boost;
                let threat = police_contact.map_or(pirate.home, |(_, position, _)| position);
                movement::move_away(&mut pirate.body, threat, dt, PIRATE_SPEC.flee_boost);

                // Lick wounds while running
                pirate.regen_fraction += FLEE_REGEN_RATE * dt;
                let whole = pirate.regen_fraction.floor();
                pirate.health.heal(whole as i32);
                pirate.regen_fraction -= whole;

                if pirate.health.fraction() > REENGAGE_HULL_FRACTION && !police_nearby {
                    pirate.set_state(PirateState::Hunt, events);
                }
            }
        }

        movement::integrate(&mut pirate.body, dt, speed_mult);
    }
}
