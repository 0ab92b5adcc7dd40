//! Error types for control system operations.

use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control system operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Wind-direction breakpoints are not strictly increasing.
    #[error("Wind direction breakpoints must be strictly increasing")]
    NonMonotonicBreakpoints,

    /// Neither the angle-of-attack nor the internal-state series is populated.
    #[error("Set-point table needs an angle-of-attack or an internal-state series")]
    NoOutputSeries,

    /// An output series does not match the number of breakpoints.
    #[error("Series {series} has {found} values, expected {expected}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        found: usize,
    },

    /// SpinRatio internal state without conversion parameters.
    #[error("Internal state kind `SpinRatio` requires conversion parameters")]
    MissingConversion,

    /// Conversion parameters supplied for a kind that ignores them.
    #[error("Internal state kind `{kind}` does not take conversion parameters")]
    UnexpectedConversion { kind: &'static str },

    /// Unknown internal state tag.
    #[error("Unknown internal state kind `{tag}`")]
    UnknownKind { tag: String },

    /// Number of controller inputs does not match the number of control loops.
    #[error("Expected {expected} controller inputs, found {found}")]
    InputCount { expected: usize, found: usize },
}
