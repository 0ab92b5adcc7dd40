//! Error types for aerodynamic models.

use sf_core::CoreError;
use thiserror::Error;

/// Result type for aerodynamic operations.
pub type AeroResult<T> = Result<T, AeroError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AeroError {
    /// Coefficient table violates its invariants.
    #[error("Invalid coefficient table: {what}")]
    InvalidTable { what: &'static str },

    /// Telemetry column does not follow the naming convention.
    #[error("Invalid telemetry column: {name}")]
    InvalidColumn { name: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}
