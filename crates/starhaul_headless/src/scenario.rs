//! Scenario loading and presets.
//!
//! A scenario is just a [`ZoneConfig`]: either one of the built-in
//! presets, or a RON file on disk.

use std::path::Path;

use thiserror::Error;

use starhaul_core::prelude::*;

/// Error type for scenario resolution.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// Neither a known preset nor an existing file.
    #[error("Unknown scenario: {0}")]
    Unknown(String),
    /// Failed to read a scenario file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse a scenario file.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// Names of the built-in presets.
pub const PRESETS: [&str; 3] = ["frontier", "pirate_siege", "trade_lanes"];

/// The default mixed zone.
#[must_use]
pub fn frontier() -> ZoneConfig {
    ZoneConfig::default()
}

/// Heavy pirate pressure against a thin police force.
#[must_use]
pub fn pirate_siege() -> ZoneConfig {
    ZoneConfig {
        name: "pirate_siege".to_string(),
        pirates: 5,
        police: 2,
        freighters: 4,
        ..ZoneConfig::default()
    }
}

/// A busy economy with no pirates and no player - pure trade flow.
#[must_use]
pub fn trade_lanes() -> ZoneConfig {
    ZoneConfig {
        name: "trade_lanes".to_string(),
        traders: 6,
        miners: 3,
        pirates: 0,
        spawn_player: false,
        ..ZoneConfig::default()
    }
}

/// Resolve a scenario by preset name or file path.
pub fn resolve(name: &str) -> std::result::Result<ZoneConfig, ScenarioError> {
    match name {
        "frontier" => return Ok(frontier()),
        "pirate_siege" => return Ok(pirate_siege()),
        "trade_lanes" => return Ok(trade_lanes()),
        _ => {}
    }

    let path = Path::new(name);
    if !path.exists() {
        return Err(ScenarioError::Unknown(name.to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    let config: ZoneConfig = ron::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_resolve() {
        for name in PRESETS {
            let config = resolve(name).unwrap();
            assert!(!config.stations.is_empty());
        }
    }

    #[test]
    fn test_unknown_scenario_errors() {
        let err = resolve("no_such_zone").unwrap_err();
        assert!(matches!(err, ScenarioError::Unknown(_)));
    }

    #[test]
    fn test_trade_lanes_has_no_pirates() {
        let config = trade_lanes();
        assert_eq!(config.pirates, 0);
        assert!(!config.spawn_player);
    }
}
