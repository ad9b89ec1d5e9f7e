//! Headless run loop.

use starhaul_core::prelude::*;

use crate::metrics::RunMetrics;

/// Configuration for one headless run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Ticks to simulate.
    pub ticks: u64,
    /// Real delta time per tick, in seconds.
    pub dt: f32,
    /// Time-scale multiplier applied to every tick.
    pub time_scale: f32,
    /// RNG seed.
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 12_000, // ten game-minutes at 20 Hz
            dt: 0.05,
            time_scale: 1.0,
            seed: 0,
        }
    }
}

/// Run one zone to completion and collect metrics.
#[must_use]
pub fn run_zone(zone_config: &ZoneConfig, run: &RunConfig) -> RunMetrics {
    let mut sim = Simulation::new(zone_config, run.seed);
    sim.set_time_scale(run.time_scale);

    let mut metrics = RunMetrics::new(zone_config.name.clone(), run.seed);

    for _ in 0..run.ticks {
        let report = sim.step(run.dt);
        for notice in &report.notices {
            tracing::debug!(category = ?notice.category, text = %notice.text, "notice");
        }
        metrics.record(&report);
    }

    metrics.finish(&sim);
    tracing::info!(
        scenario = %metrics.scenario,
        seed = metrics.seed,
        ticks = metrics.ticks,
        orders_completed = metrics.orders_completed,
        ships_lost = metrics.ships_lost,
        "run finished"
    );
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario;

    #[test]
    fn test_short_run_produces_metrics() {
        let run = RunConfig {
            ticks: 100,
            seed: 7,
            ..Default::default()
        };
        let metrics = run_zone(&scenario::frontier(), &run);
        assert_eq!(metrics.ticks, 100);
        assert!(metrics.game_time > 4.9);
        assert_ne!(metrics.final_state_hash, 0);
    }

    #[test]
    fn test_same_seed_reproduces_hash() {
        let run = RunConfig {
            ticks: 200,
            seed: 11,
            ..Default::default()
        };
        let a = run_zone(&scenario::frontier(), &run);
        let b = run_zone(&scenario::frontier(), &run);
        assert_eq!(a.final_state_hash, b.final_state_hash);
    }
}
