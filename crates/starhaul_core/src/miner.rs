//! Mining ship state machine.
//!
//! Miners work the asteroid field: seek a rock with ore left, chew
//! through it on a fixed interval, haul the ore home, and convert it 1:1
//! into station materials at the dock.

use rand::Rng;

use crate::components::{Asteroid, Body, EntityId, Health};
use crate::events::ZoneEvent;
use crate::math::Vec2;
use crate::movement;
use crate::ships::{ShipClass, MINER_SPEC};
use crate::station::{Station, StationKind};
use crate::trader::{DOCK_RADIUS, DOCK_TIME_MAX, DOCK_TIME_MIN};

/// Distance within which a miner can work an asteroid.
pub const MINING_RANGE: f32 = 40.0;

/// Seconds per extracted ore unit.
pub const MINING_INTERVAL: f32 = 2.0;

/// Wander radius while no asteroid has ore left.
const IDLE_PATROL_RADIUS: f32 = 200.0;

/// Miner behavior states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinerState {
    /// Looking for an asteroid with remaining ore.
    SeekAsteroid,
    /// Parked at a rock, extracting.
    Mine,
    /// Hauling ore back to the home station.
    Return,
}

impl MinerState {
    /// Stable name for AI-decision events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SeekAsteroid => "seek_asteroid",
            Self::Mine => "mine",
            Self::Return => "return",
        }
    }
}

/// An ore hauler.
#[derive(Debug, Clone)]
pub struct Miner {
    /// Entity id.
    pub id: EntityId,
    /// Position/velocity/speed cap.
    pub body: Body,
    /// Hull.
    pub health: Health,
    /// Carried ore units.
    pub ore: u32,
    /// Ore capacity.
    pub capacity: u32,
    /// Current behavior state.
    pub state: MinerState,
    /// Asteroid being worked.
    pub target: Option<EntityId>,
    /// Home station receiving the ore.
    pub home: EntityId,
    /// Progress toward the next extracted unit.
    pub mine_timer: f32,
    /// Remaining dock time; positive only while docked at home.
    pub dock_timer: f32,
    /// Seconds spent in the current state.
    pub state_timer: f32,
    /// Idle wander waypoint.
    pub waypoint: Vec2,
    /// Seconds until this miner may raise another distress beacon.
    pub beacon_rearm: f32,
}

impl Miner {
    /// Create a miner homed at a station.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, max_speed: f32, hull: i32, home: EntityId) -> Self {
        Self {
            id,
            body: Body::new(position, max_speed),
            health: Health {
                hull,
                max_hull: hull,
            },
            ore: 0,
            capacity: MINER_SPEC.cargo_capacity,
            state: MinerState::SeekAsteroid,
            target: None,
            home,
            mine_timer: 0.0,
            dock_timer: 0.0,
            state_timer: 0.0,
            waypoint: position,
            beacon_rearm: 0.0,
        }
    }

    /// Docked miners are immobile and not valid pirate prey.
    #[must_use]
    pub fn is_docked(&self) -> bool {
        matches!(self.state, MinerState::Return) && self.dock_timer > 0.0
    }

    fn set_state(&mut self, state: MinerState, events: &mut Vec<ZoneEvent>) {
        if self.state != state {
            self.state = state;
            self.state_timer = 0.0;
            events.push(ZoneEvent::StateChanged {
                ship: self.id,
                class: ShipClass::Miner,
                state: state.name(),
            });
        }
    }
}

fn nearest_ore(position: Vec2, asteroids: &[Asteroid]) -> Option<(EntityId, Vec2, f32)> {
    asteroids
        .iter()
        .filter(|a| !a.is_depleted())
        .map(|a| (a.id, a.position, position.distance(a.position)))
        .min_by(|a, b| a.2.total_cmp(&b.2))
}

/// Resolve the home station, falling back to the nearest mining station
/// when the original is gone.
fn home_station(miner: &mut Miner, stations: &[Station]) -> Option<Vec2> {
    if let Some(station) = stations.iter().find(|s| s.id == miner.home) {
        return Some(station.position);
    }
    let fallback = stations
        .iter()
        .filter(|s| s.kind == StationKind::Mining)
        .map(|s| (s.id, s.position, miner.body.position.distance(s.position)))
        .min_by(|a, b| a.2.total_cmp(&b.2))?;
    miner.home = fallback.0;
    Some(fallback.1)
}

/// Advance every miner by one tick.
pub fn miner_system<R: Rng>(
    miners: &mut [Miner],
    asteroids: &mut [Asteroid],
    stations: &mut [Station],
    dt: f32,
    rng: &mut R,
    events: &mut Vec<ZoneEvent>,
) {
    for miner in miners.iter_mut() {
        miner.state_timer += dt;
        miner.beacon_rearm = (miner.beacon_rearm - dt).max(0.0);

        if miner.state != MinerState::SeekAsteroid && miner.state_timer > MINER_SPEC.state_timeout
        {
            miner.target = None;
            miner.dock_timer = 0.0;
            miner.set_state(MinerState::SeekAsteroid, events);
        }

        match miner.state {
            MinerState::SeekAsteroid => {
                if miner.ore >= miner.capacity {
                    miner.set_state(MinerState::Return, events);
                    movement::integrate(&mut miner.body, dt, 1.0);
                    continue;
                }

                match nearest_ore(miner.body.position, asteroids) {
                    Some((id, position, dist)) => {
                        miner.target = Some(id);
                        movement::seek(&mut miner.body, position, dt);
                        if dist <= MINING_RANGE {
                            miner.mine_timer = 0.0;
                            miner.set_state(MinerState::Mine, events);
                        }
                    }
                    None if miner.ore > 0 => {
                        miner.set_state(MinerState::Return, events);
                    }
                    None => {
                        let home = miner.body.position;
                        movement::patrol(
                            &mut miner.body,
                            &mut miner.waypoint,
                            home,
                            IDLE_PATROL_RADIUS,
                            dt,
                            rng,
                        );
                    }
                }
                movement::integrate(&mut miner.body, dt, 1.0);
            }

            MinerState::Mine => {
                let target = miner
                    .target
                    .and_then(|id| asteroids.iter_mut().find(|a| a.id == id))
                    .filter(|a| !a.is_depleted());
                let Some(asteroid) = target else {
                    miner.target = None;
                    let next = if miner.ore >= miner.capacity {
                        MinerState::Return
                    } else {
                        MinerState::SeekAsteroid
                    };
                    miner.set_state(next, events);
                    movement::integrate(&mut miner.body, dt, 1.0);
                    continue;
                };

                let dist = miner.body.distance_to(asteroid.position);
                if dist > MINING_RANGE {
                    // Drifted off the rock
                    movement::seek(&mut miner.body, asteroid.position, dt);
                    movement::integrate(&mut miner.body, dt, 1.0);
                    continue;
                }

                miner.mine_timer += dt;
                while miner.mine_timer >= MINING_INTERVAL && miner.ore < miner.capacity {
                    miner.mine_timer -= MINING_INTERVAL;
                    miner.ore += asteroid.extract(1);
                    if asteroid.is_depleted() {
                        events.push(ZoneEvent::AsteroidDepleted { asteroid: asteroid.id });
                        miner.target = None;
                        break;
                    }
                }

                if miner.ore >= miner.capacity {
                    miner.set_state(MinerState::Return, events);
                } else if miner.target.is_none() {
                    miner.set_state(MinerState::SeekAsteroid, events);
                }
                movement::integrate(&mut miner.body, dt, 1.0);
            }

            MinerState::Return => {
                if miner.dock_timer > 0.0 {
                    miner.dock_timer -= dt;
                    if miner.dock_timer <= 0.0 {
                        miner.dock_timer = 0.0;
                        miner.set_state(MinerState::SeekAsteroid, events);
                    }
                    continue;
                }

                let Some(home_pos) = home_station(miner, stations) else {
                    miner.set_state(MinerState::SeekAsteroid, events);
                    movement::integrate(&mut miner.body, dt, 1.0);
                    continue;
                };

                let dist = movement::seek(&mut miner.body, home_pos, dt);
                if dist <= DOCK_RADIUS {
                    // Refine the haul 1:1 into station materials
                    if miner.ore > 0 {
                        if let Some(station) = stations.iter_mut().find(|s| s.id == miner.home) {
                            station.add_stock(
                                crate::components::Resource::Materials,
                                miner.ore as f32,
                            );
                            events.push(ZoneEvent::OreRefined {
                                station: station.id,
                                miner: miner.id,
                                amount: miner.ore,
                            });
                        }
                        miner.ore = 0;
                    }
                    miner.body.velocity = Vec2::ZERO;
                    miner.dock_timer = rng.gen_range(DOCK_TIME_MIN..=DOCK_TIME_MAX);
                } else {
                    movement::integrate(&mut miner.body, dt, 1.0);
                }
            }
        }
    }
}
