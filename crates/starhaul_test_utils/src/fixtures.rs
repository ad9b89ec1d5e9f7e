//! Test fixtures and helpers.
//!
//! Pre-built zones and entity configurations for consistent testing.

use rand::rngs::StdRng;
use rand::SeedableRng;

use starhaul_core::prelude::*;

/// Fixed tick length used by fixtures (20 Hz, the render-loop rate the
/// game targets).
pub const TICK_DT: f32 = 0.05;

/// A fully populated default-zone simulation.
#[must_use]
pub fn default_sim(seed: u64) -> Simulation {
    Simulation::new(&ZoneConfig::default(), seed)
}

/// A zone with stations only - no ships, no player.
#[must_use]
pub fn stations_only_config() -> ZoneConfig {
    ZoneConfig {
        traders: 0,
        miners: 0,
        freighters: 0,
        pirates: 0,
        police: 0,
        spawn_player: false,
        ..ZoneConfig::default()
    }
}

/// An empty zone wrapped in a simulation, for hand-built scenarios.
#[must_use]
pub fn empty_sim(seed: u64) -> Simulation {
    let zone = Zone::default();
    Simulation::from_zone(zone, StdRng::seed_from_u64(seed))
}

/// Step a simulation for `seconds` of game time at the fixture tick rate,
/// returning every report.
pub fn run_for(sim: &mut Simulation, seconds: f32) -> Vec<TickReport> {
    let ticks = (seconds / TICK_DT).ceil() as usize;
    (0..ticks).map(|_| sim.step(TICK_DT)).collect()
}

/// Assert two floats are within `epsilon` of each other.
///
/// # Panics
///
/// Panics with both values when they differ by more than `epsilon`.
pub fn assert_close(a: f32, b: f32, epsilon: f32) {
    assert!(
        (a - b).abs() <= epsilon,
        "expected {a} and {b} to be within {epsilon}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sim_is_populated() {
        let sim = default_sim(1);
        assert!(sim.zone.ship_count() > 0);
        assert!(!sim.zone.stations.is_empty());
    }

    #[test]
    fn test_run_for_advances_time() {
        let mut sim = default_sim(1);
        let reports = run_for(&mut sim, 1.0);
        assert_eq!(reports.len(), 20);
        assert_close(sim.game_time() as f32, 1.0, 1e-3);
    }
}
