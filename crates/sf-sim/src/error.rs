//! Error types for driving the lifting-line engine.

use sf_controls::ControlError;
use sf_project::ProjectError;
use thiserror::Error;

/// Failure reported by the engine itself, passed through unmodified.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Engine returned {found} {what}, expected {expected}")]
    EngineShape {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Engine(EngineError),

    #[error("Configuration error: {0}")]
    Project(#[from] ProjectError),

    #[error("Controller error: {0}")]
    Control(#[from] ControlError),
}

pub type SimResult<T> = Result<T, SimError>;
