//! Error types for the simulation.
//!
//! These cover API-level misuse only. Inside the tick loop, stale
//! references, failed trades and timeouts are ordinary state-machine
//! branches that return outcome values, never errors.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for simulation API failures.
#[derive(Debug, Error)]
pub enum SimError {
    /// Unknown zone or scenario identifier.
    #[error("Unknown zone: {0}")]
    UnknownZone(String),

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(u64),

    /// Invalid simulation state.
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),

    /// Zone configuration failed to parse.
    #[error("Failed to parse zone config: {0}")]
    ConfigParseError(String),
}
