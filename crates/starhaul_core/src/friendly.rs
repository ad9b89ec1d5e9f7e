//! Civilian freighter state machine.
//!
//! Freighters cruise between stations and gates, run from pirates, and
//! raise distress beacons when shot at. They carry no cargo the economy
//! tracks; their job is to be traffic worth protecting.

use rand::Rng;

use crate::combat::TargetRef;
use crate::components::{Body, EntityId, Health};
use crate::events::ZoneEvent;
use crate::math::Vec2;
use crate::movement::{self, ARRIVE_RADIUS};
use crate::ships::{ShipClass, FREIGHTER_SPEC};

/// Freighter behavior states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreighterState {
    /// Cruising toward the current waypoint.
    Cruise,
    /// Running from a nearby pirate.
    Flee,
}

impl FreighterState {
    /// Stable name for AI-decision events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cruise => "cruise",
            Self::Flee => "flee",
        }
    }
}

/// A civilian freighter.
#[derive(Debug, Clone)]
pub struct Freighter {
    /// Entity id.
    pub id: EntityId,
    /// Position/velocity/speed cap.
    pub body: Body,
    /// Hull.
    pub health: Health,
    /// Current behavior state.
    pub state: FreighterState,
    /// Current cruise destination.
    pub waypoint: Vec2,
    /// Seconds spent in the current state.
    pub state_timer: f32,
    /// Seconds until this ship may raise another distress beacon.
    pub beacon_rearm: f32,
}

impl Freighter {
    /// Create a freighter at a position.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, max_speed: f32, hull: i32) -> Self {
        Self {
            id,
            body: Body::new(position, max_speed),
            health: Health {
                hull,
                max_hull: hull,
            },
            state: FreighterState::Cruise,
            waypoint: position,
            state_timer: 0.0,
            beacon_rearm: 0.0,
        }
    }

    fn set_state(&mut self, state: FreighterState, events: &mut Vec<ZoneEvent>) {
        if self.state != state {
            self.state = state;
            self.state_timer = 0.0;
            events.push(ZoneEvent::StateChanged {
                ship: self.id,
                class: ShipClass::Freighter,
                state: state.name(),
            });
        }
    }
}

fn nearest_pirate(position: Vec2, pirates: &[TargetRef]) -> Option<(Vec2, f32)> {
    pirates
        .iter()
        .map(|p| (p.position, position.distance(p.position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Advance every freighter by one tick.
///
/// `waypoints` is the set of cruise destinations (station and gate
/// positions).
pub fn freighter_system<R: Rng>(
    freighters: &mut [Freighter],
    pirates: &[TargetRef],
    waypoints: &[Vec2],
    dt: f32,
    rng: &mut R,
    events: &mut Vec<ZoneEvent>,
) {
    for freighter in freighters.iter_mut() {
        freighter.state_timer += dt;
        freighter.beacon_rearm = (freighter.beacon_rearm - dt).max(0.0);

        if freighter.state != FreighterState::Cruise
            && freighter.state_timer > FREIGHTER_SPEC.state_timeout
        {
            freighter.set_state(FreighterState::Cruise, events);
        }

        let threat = nearest_pirate(freighter.body.position, pirates);

        let mut speed_mult = 1.0;
        match freighter.state {
            FreighterState::Cruise => {
                if threat.is_some_and(|(_, d)| d <= FREIGHTER_SPEC.detection_range) {
                    freighter.set_state(FreighterState::Flee, events);
                } else {
                    if freighter.body.position.distance(freighter.waypoint) <= ARRIVE_RADIUS {
                        if let Some(&next) =
                            waypoints.get(rng.gen_range(0..waypoints.len().max(1)))
                        {
                            freighter.waypoint = next;
                        }
                    }
                    movement::seek(&mut freighter.body, freighter.waypoint, dt);
                }
            }

            FreighterState::Flee => {
                speed_mult = FREIGHTER_SPEC.flee_boost;
                match threat {
                    Some((position, dist)) => {
                        movement::move_away(
                            &mut freighter.body,
                            position,
                            dt,
                            FREIGHTER_SPEC.flee_boost,
                        );
                        if dist > FREIGHTER_SPEC.detection_range * 1.5 {
                            freighter.set_state(FreighterState::Cruise, events);
                        }
                    }
                    None => freighter.set_state(FreighterState::Cruise, events),
                }
            }
        }

        movement::integrate(&mut freighter.body, dt, speed_mult);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 0.05;

    fn freighter_at(x: f32, y: f32) -> Freighter {
        Freighter::new(1, Vec2::new(x, y), FREIGHTER_SPEC.max_speed, FREIGHTER_SPEC.max_hull)
    }

    fn run_system(
        freighters: &mut [Freighter],
        pirates: &[TargetRef],
        waypoints: &[Vec2],
        dt: f32,
    ) -> Vec<ZoneEvent> {
        let mut rng = StdRng::seed_from_u64(4);
        let mut events = Vec::new();
        freighter_system(freighters, pirates, waypoints, dt, &mut rng, &mut events);
        events
    }

    #[test]
    fn test_cruise_picks_new_waypoint_on_arrival() {
        let mut freighters = vec![freighter_at(0.0, 0.0)];
        let waypoints = [Vec2::new(600.0, 0.0), Vec2::new(0.0, 600.0)];

        run_system(&mut freighters, &[], &waypoints, DT);
        assert!(waypoints.contains(&freighters[0].waypoint));
    }

    #[test]
    fn test_nearby_pirate_triggers_flee() {
        let mut freighters = vec![freighter_at(0.0, 0.0)];
        let pirates = [TargetRef {
            id: 9,
            position: Vec2::new(100.0, 0.0),
        }];

        run_system(&mut freighters, &pirates, &[], DT);
        assert_eq!(freighters[0].state, FreighterState::Flee);
    }

    #[test]
    fn test_flee_ends_when_clear() {
        let mut freighters = vec![freighter_at(0.0, 0.0)];
        freighters[0].state = FreighterState::Flee;
        let pirates = [TargetRef {
            id: 9,
            position: Vec2::new(FREIGHTER_SPEC.detection_range * 2.0, 0.0),
        }];

        run_system(&mut freighters, &pirates, &[], DT);
        assert_eq!(freighters[0].state, FreighterState::Cruise);
    }

    #[test]
    fn test_flee_outruns_cruise_speed() {
        let mut freighters = vec![freighter_at(0.0, 0.0)];
        freighters[0].state = FreighterState::Flee;
        let pirates = [TargetRef {
            id: 9,
            position: Vec2::new(-10.0, 0.0),
        }];

        for _ in 0..40 {
            run_system(&mut freighters, &pirates, &[], DT);
        }
        assert!(freighters[0].body.velocity.length() > FREIGHTER_SPEC.max_speed);
    }
}
