//! Error types for input power models.

use sf_core::CoreError;
use thiserror::Error;

pub type PowerResult<T> = Result<T, PowerError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PowerError {
    /// Power table violates its invariants.
    #[error("Invalid input power table: {what}")]
    InvalidTable { what: &'static str },

    /// Variant and payload do not agree.
    #[error("Input power model `{tag}` {problem}")]
    Payload {
        tag: &'static str,
        problem: &'static str,
    },

    #[error("Unknown input power model `{tag}`")]
    UnknownTag { tag: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}
