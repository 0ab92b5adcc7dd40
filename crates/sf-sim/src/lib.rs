//! sf-sim: driving the external lifting-line engine through time.
//!
//! Provides:
//! - the engine boundary (build from a serialized document, set commands, step)
//! - a strictly sequential per-scenario driver feeding the sampled controller
//! - parallel sweeps over independent scenarios, and the loading sweep built on them

pub mod engine;
pub mod error;
pub mod scenario;

pub use engine::{EngineFactory, LiftingLineEngine, SimulationStepResult};
pub use error::{EngineError, SimError, SimResult};
pub use scenario::{
    LoadingOptimum, Scenario, ScenarioRunner, SimOptions, SimRecord, StepSnapshot, WindCondition,
    optimal_loading, run_sweep,
};
