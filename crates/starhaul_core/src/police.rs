//! Police patrol state machine.
//!
//! Police cycle station waypoints, divert to distress beacons, and
//! intercept pirates with spread-fire bursts.

use rand::Rng;

use crate::combat::{Projectile, TargetRef};
use crate::components::{Body, DistressBeacon, EntityId, Health};
use crate::events::ZoneEvent;
use crate::math::Vec2;
use crate::movement::{self, ARRIVE_RADIUS};
use crate::ships::{ShipClass, POLICE_SPEC};

/// Seconds held at each patrol waypoint.
const PATROL_HOLD: f32 = 3.0;

/// Shots per burst.
const BURST_COUNT: u32 = 3;

/// Angular spread between burst shots, radians.
const BURST_SPREAD: f32 = 0.12;

/// Projectile flight time.
const SHOT_LIFETIME: f32 = 1.5;

/// Police behavior states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoliceState {
    /// Cycling station waypoints.
    Patrol,
    /// Heading to a distress beacon.
    Respond,
    /// Chasing and engaging a pirate.
    Intercept,
}

impl PoliceState {
    /// Stable name for AI-decision events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Patrol => "patrol",
            Self::Respond => "respond",
            Self::Intercept => "intercept",
        }
    }
}

/// A police patrol ship.
#[derive(Debug, Clone)]
pub struct Police {
    /// Entity id.
    pub id: EntityId,
    /// Position/velocity/speed cap.
    pub body: Body,
    /// Hull.
    pub health: Health,
    /// Current behavior state.
    pub state: PoliceState,
    /// Pirate being intercepted.
    pub target: Option<EntityId>,
    /// Beacon being answered.
    pub beacon: Option<EntityId>,
    /// Index into the patrol waypoint cycle.
    pub waypoint_index: usize,
    /// Remaining hold time at the current waypoint.
    pub hold_timer: f32,
    /// Seconds until the next burst.
    pub fire_cooldown: f32,
    /// Seconds spent in the current state.
    pub state_timer: f32,
}

impl Police {
    /// Create a police ship at a position.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, max_speed: f32, hull: i32) -> Self {
        Self {
            id,
            body: Body::new(position, max_speed),
            health: Health {
                hull,
                max_hull: hull,
            },
            state: PoliceState::Patrol,
            target: None,
            beacon: None,
            waypoint_index: 0,
            hold_timer: 0.0,
            fire_cooldown: 0.0,
            state_timer: 0.0,
        }
    }

    fn set_state(&mut self, state: PoliceState, events: &mut Vec<ZoneEvent>) {
        if self.state != state {
            self.state = state;
            self.state_timer = 0.0;
            events.push(ZoneEvent::StateChanged {
                ship: self.id,
                class: ShipClass::Police,
                state: state.name(),
            });
        }
    }
}

fn nearest_pirate(position: Vec2, pirates: &[TargetRef]) -> Option<(EntityId, f32)> {
    pirates
        .iter()
        .map(|p| (p.id, position.distance(p.position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Advance every police ship by one tick.
///
/// `waypoints` is the station patrol circuit; `beacons` is mutable so a
/// responder can mark its beacon answered on arrival.
pub fn police_system<R: Rng>(
    police: &mut [Police],
    pirates: &[TargetRef],
    beacons: &mut [DistressBeacon],
    waypoints: &[Vec2],
    dt: f32,
    rng: &mut R,
    next_id: &mut EntityId,
    projectiles: &mut Vec<Projectile>,
    events: &mut Vec<ZoneEvent>,
) {
    for officer in police.iter_mut() {
        officer.state_timer += dt;
        officer.fire_cooldown = (officer.fire_cooldown - dt).max(0.0);

        if officer.state != PoliceState::Patrol && officer.state_timer > POLICE_SPEC.state_timeout {
            officer.target = None;
            officer.beacon = None;
            officer.set_state(PoliceState::Patrol, events);
        }

        match officer.state {
            PoliceState::Patrol => {
                // Direct sighting beats beacon response
                if let Some((pirate, dist)) = nearest_pirate(officer.body.position, pirates) {
                    if dist <= POLICE_SPEC.detection_range {
                        officer.target = Some(pirate);
                        officer.set_state(PoliceState::Intercept, events);
                        movement::integrate(&mut officer.body, dt, 1.0);
                        continue;
                    }
                }

                if let Some(beacon) = beacons.iter().find(|b| !b.responded) {
                    officer.beacon = Some(beacon.id);
                    officer.set_state(PoliceState::Respond, events);
                    movement::integrate(&mut officer.body, dt, 1.0);
                    continue;
                }

                if !waypoints.is_empty() {
                    let waypoint = waypoints[officer.waypoint_index % waypoints.len()];
                    let dist = movement::seek(&mut officer.body, waypoint, dt);
                    if dist <= ARRIVE_RADIUS {
                        officer.hold_timer += dt;
                        if officer.hold_timer >= PATROL_HOLD {
                            officer.hold_timer = 0.0;
                            officer.waypoint_index =
                                (officer.waypoint_index + 1) % waypoints.len();
                        }
                    }
                }
            }

            PoliceState::Respond => {
                let Some(beacon) = officer
                    .beacon
                    .and_then(|id| beacons.iter_mut().find(|b| b.id == id))
                else {
                    // Beacon expired mid-flight
                    officer.beacon = None;
                    officer.set_state(PoliceState::Patrol, events);
                    movement::integrate(&mut officer.body, dt, 1.0);
                    continue;
                };

                let dist = movement::seek(&mut officer.body, beacon.position, dt);
                if dist <= ARRIVE_RADIUS {
                    beacon.responded = true;
                    events.push(ZoneEvent::BeaconAnswered {
                        beacon: beacon.id,
                        police: officer.id,
                    });
                    officer.beacon = None;

                    // Re-scan at the scene
                    match nearest_pirate(officer.body.position, pirates)
                        .filter(|(_, d)| *d <= POLICE_SPEC.detection_range)
                    {
                        Some((pirate, _)) => {
                            officer.target = Some(pirate);
                            officer.set_state(PoliceState::Intercept, events);
                        }
                        None => officer.set_state(PoliceState::Patrol, events),
                    }
                }
            }

            PoliceState::Intercept => {
                let target = officer
                    .target
                    .and_then(|id| pirates.iter().find(|p| p.id == id));
                let Some(target) = target else {
                    officer.target = None;
                    officer.set_state(PoliceState::Patrol, events);
                    movement::integrate(&mut officer.body, dt, 1.0);
                    continue;
                };

                let dist = officer.body.distance_to(target.position);
                if dist > POLICE_SPEC.detection_range * 2.0 {
                    officer.target = None;
                    officer.set_state(PoliceState::Patrol, events);
                    movement::integrate(&mut officer.body, dt, 1.0);
                    continue;
                }

                movement::seek(&mut officer.body, target.position, dt);

                if officer.fire_cooldown <= 0.0 && dist <= POLICE_SPEC.attack_range {
                    let aim = (target.position - officer.body.position).angle();
                    for i in 0..BURST_COUNT {
                        let offset = (i as f32 - (BURST_COUNT - 1) as f32 / 2.0) * BURST_SPREAD;
                        let jitter = rng.gen_range(-BURST_SPREAD * 0.25..=BURST_SPREAD * 0.25);
                        let id = *next_id;
                        *next_id += 1;
                        projectiles.push(Projectile::new(
                            id,
                            officer.id,
                            officer.body.position,
                            aim + offset + jitter,
                            POLICE_SPEC.projectile_speed,
                            SHOT_LIFETIME,
                            POLICE_SPEC.projectile_damage,
                            false,
                        ));
                    }
                    officer.fire_cooldown = POLICE_SPEC.fire_cooldown;
                }
            }
        }

        movement::integrate(&mut officer.body, dt, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 0.05;

    fn officer_at(x: f32, y: f32) -> Police {
        Police::new(1, Vec2::new(x, y), POLICE_SPEC.max_speed, POLICE_SPEC.max_hull)
    }

    fn run_system(
        police: &mut [Police],
        pirates: &[TargetRef],
        beacons: &mut [DistressBeacon],
        waypoints: &[Vec2],
        dt: f32,
    ) -> (Vec<Projectile>, Vec<ZoneEvent>) {
        let mut rng = StdRng::seed_from_u64(2);
        let mut next_id = 2000;
        let mut projectiles = Vec::new();
        let mut events = Vec::new();
        police_system(
            police,
            pirates,
            beacons,
            waypoints,
            dt,
            &mut rng,
            &mut next_id,
            &mut projectiles,
            &mut events,
        );
        (projectiles, events)
    }

    #[test]
    fn test_patrol_advances_waypoints_after_hold() {
        let mut police = vec![officer_at(0.0, 0.0)];
        let waypoints = [Vec2::new(0.0, 0.0), Vec2::new(500.0, 0.0)];

        // Standing on waypoint 0: hold, then advance
        let mut ticks = 0;
        while police[0].waypoint_index == 0 && ticks < 200 {
            run_system(&mut police, &[], &mut [], &waypoints, DT);
            ticks += 1;
        }
        assert_eq!(police[0].waypoint_index, 1);
        assert!(ticks as f32 * DT >= PATROL_HOLD);
    }

    #[test]
    fn test_beacon_triggers_response() {
        let mut police = vec![officer_at(0.0, 0.0)];
        let mut beacons = [DistressBeacon::new(50, Vec2::new(400.0, 0.0), 7)];

        run_system(&mut police, &[], &mut beacons, &[], DT);
        assert_eq!(police[0].state, PoliceState::Respond);
        assert_eq!(police[0].beacon, Some(50));
    }

    #[test]
    fn test_sighting_preempts_beacon() {
        let mut police = vec![officer_at(0.0, 0.0)];
        let mut beacons = [DistressBeacon::new(50, Vec2::new(400.0, 0.0), 7)];
        let pirates = [TargetRef {
            id: 9,
            position: Vec2::new(200.0, 0.0),
        }];

        run_system(&mut police, &pirates, &mut beacons, &[], DT);
        assert_eq!(police[0].state, PoliceState::Intercept);
        assert_eq!(police[0].target, Some(9));
    }

    #[test]
    fn test_arrival_marks_beacon_responded() {
        let mut police = vec![officer_at(0.0, 0.0)];
        police[0].state = PoliceState::Respond;
        police[0].beacon = Some(50);
        let mut beacons = [DistressBeacon::new(50, Vec2::new(10.0, 0.0), 7)];

        let (_, events) = run_system(&mut police, &[], &mut beacons, &[], DT);
        assert!(beacons[0].responded);
        assert!(events
            .iter()
            .any(|e| matches!(e, ZoneEvent::BeaconAnswered { beacon: 50, .. })));
        // No pirate at the scene: back to patrol
        assert_eq!(police[0].state, PoliceState::Patrol);
    }

    #[test]
    fn test_expired_beacon_resets_to_patrol() {
        let mut police = vec![officer_at(0.0, 0.0)];
        police[0].state = PoliceState::Respond;
        police[0].beacon = Some(50); // beacon no longer exists

        run_system(&mut police, &[], &mut [], &[], DT);
        assert_eq!(police[0].state, PoliceState::Patrol);
        assert_eq!(police[0].beacon, None);
    }

    #[test]
    fn test_intercept_fires_burst_in_range() {
        let mut police = vec![officer_at(0.0, 0.0)];
        police[0].state = PoliceState::Intercept;
        police[0].target = Some(9);
        let pirates = [TargetRef {
            id: 9,
            position: Vec2::new(150.0, 0.0),
        }];

        let (projectiles, _) = run_system(&mut police, &pirates, &mut [], &[], DT);
        assert_eq!(projectiles.len(), BURST_COUNT as usize);
        assert!(projectiles.iter().all(|p| !p.hostile));
        // Spread: not all shots share a heading
        let first = projectiles[0].velocity.angle();
        assert!(projectiles.iter().any(|p| p.velocity.angle() != first));
    }

    #[test]
    fn test_intercept_gives_up_beyond_double_sensor() {
        let mut police = vec![officer_at(0.0, 0.0)];
        police[0].state = PoliceState::Intercept;
        police[0].target = Some(9);
        let pirates = [TargetRef {
            id: 9,
            position: Vec2::new(POLICE_SPEC.detection_range * 2.0 + 50.0, 0.0),
        }];

        run_system(&mut police, &pirates, &mut [], &[], DT);
        assert_eq!(police[0].state, PoliceState::Patrol);
        assert_eq!(police[0].target, None);
    }

    #[test]
    fn test_dead_target_resets_same_tick() {
        let mut police = vec![officer_at(0.0, 0.0)];
        police[0].state = PoliceState::Intercept;
        police[0].target = Some(9);

        let (projectiles, _) = run_system(&mut police, &[], &mut [], &[], DT);
        assert_eq!(police[0].state, PoliceState::Patrol);
        assert!(projectiles.is_empty());
    }
}
