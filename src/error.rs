//! Error types for the simulation.

use thiserror::Error;

/// Errors returned by simulation commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// No line with this id exists.
    #[error("unknown line: {0}")]
    UnknownLine(String),

    /// Thresholds must be finite with `min < max`.
    #[error("invalid thresholds: min {min} must be below max {max}")]
    InvalidThresholds { min: f64, max: f64 },

    /// The simulation clock has been stopped.
    #[error("simulation clock is stopped")]
    Stopped,
}
