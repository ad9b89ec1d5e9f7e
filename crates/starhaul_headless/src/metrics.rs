//! Run metrics collection for balance analysis.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use starhaul_core::prelude::*;

/// Complete metrics for one headless run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Random seed used.
    pub seed: u64,
    /// Ticks simulated.
    pub ticks: u64,
    /// Game time covered, in seconds.
    pub game_time: f64,
    /// Event counts per category.
    pub events_by_category: HashMap<String, u64>,
    /// Orders completed over the run.
    pub orders_completed: u64,
    /// Orders abandoned/released over the run.
    pub orders_released: u64,
    /// Ships destroyed over the run.
    pub ships_lost: u64,
    /// Final population per ship class.
    pub final_population: HashMap<String, usize>,
    /// Sum of station credit balances at the end.
    pub station_credits: i64,
    /// Sum of trader credit balances at the end.
    pub trader_credits: i64,
    /// Orders still open at the end.
    pub open_orders: usize,
    /// Whether the player survived (absent players count as false).
    pub player_alive: bool,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl RunMetrics {
    /// Create metrics for a scenario/seed pair.
    #[must_use]
    pub fn new(scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Fold one tick report into the counters.
    pub fn record(&mut self, report: &TickReport) {
        for event in &report.events {
            *self
                .events_by_category
                .entry(event.category().name().to_string())
                .or_insert(0) += 1;
            match event {
                ZoneEvent::OrderCompleted { .. } => self.orders_completed += 1,
                ZoneEvent::OrderReleased { .. } => self.orders_released += 1,
                ZoneEvent::ShipDestroyed { .. } => self.ships_lost += 1,
                _ => {}
            }
        }
    }

    /// Capture the final state of a finished run.
    pub fn finish(&mut self, sim: &Simulation) {
        self.ticks = sim.tick();
        self.game_time = sim.game_time();
        self.final_state_hash = sim.state_hash();

        let zone = &sim.zone;
        self.final_population = HashMap::from([
            (ShipClass::Pirate.name().to_string(), zone.pirates.len()),
            (ShipClass::Police.name().to_string(), zone.police.len()),
            (ShipClass::Trader.name().to_string(), zone.traders.len()),
            (ShipClass::Miner.name().to_string(), zone.miners.len()),
            (
                ShipClass::Freighter.name().to_string(),
                zone.freighters.len(),
            ),
        ]);
        self.station_credits = zone.stations.iter().map(|s| s.credits).sum();
        self.trader_credits = zone.traders.iter().map(|t| t.credits).sum();
        self.open_orders = zone.orders.len();
        self.player_alive = zone.player.is_some();
    }
}
