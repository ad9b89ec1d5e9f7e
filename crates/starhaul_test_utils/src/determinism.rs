//! Determinism testing utilities.
//!
//! The simulation promises that one seed plus one step sequence replays
//! exactly. Sources of non-determinism this harness guards against:
//!
//! - **Unseeded randomness**: all rolls flow through the simulation's
//!   `StdRng`; a stray `thread_rng` call shows up here immediately.
//! - **HashMap iteration order**: collections iterate in vector or
//!   sorted-id order, never raw map order.
//! - **Entity id reuse**: ids are allocated from a monotonic counter, so
//!   a run can never alias two entities across time.
//!
//! Floating-point results are reproducible on one platform/binary, which
//! is the scope the single-process game needs.

use starhaul_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final state hash from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated per run.
    pub ticks: u64,
}

impl DeterminismResult {
    /// All unique hashes (should be exactly 1 for a deterministic sim).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert the runs matched, with a detailed message.
    ///
    /// # Panics
    ///
    /// Panics if any run produced a different final hash.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic,
            "simulation diverged across {} runs of {} ticks: hashes {:?}",
            self.hashes.len(),
            self.ticks,
            self.unique_hashes()
        );
    }
}

/// Run the same config/seed `runs` times for `ticks` ticks and compare
/// final state hashes.
#[must_use]
pub fn run_determinism_test(
    config: &ZoneConfig,
    seed: u64,
    ticks: u64,
    dt: f32,
    runs: usize,
) -> DeterminismResult {
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut sim = Simulation::new(config, seed);
            for _ in 0..ticks {
                sim.step(dt);
            }
            sim.state_hash()
        })
        .collect();

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_zone_is_deterministic() {
        let result = run_determinism_test(&ZoneConfig::default(), 99, 100, 0.05, 3);
        result.assert_deterministic();
    }

    #[test]
    fn test_unique_hashes_dedupes() {
        let result = DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2, 1],
            ticks: 10,
        };
        assert_eq!(result.unique_hashes(), vec![1, 2]);
    }
}
