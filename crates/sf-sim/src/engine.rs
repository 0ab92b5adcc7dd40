//! The lifting-line engine as seen from this side of the boundary.
//!
//! The engine is an opaque collaborator: it is built once from the serialized configuration
//! document and then stepped in increasing time order. It keeps wake memory between steps, so one
//! engine instance belongs to exactly one scenario.

use sf_core::SpatialVector;

use crate::error::EngineError;

/// Output of one engine step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationStepResult {
    /// Integrated force per device, engine frame (N).
    pub integrated_forces: Vec<SpatialVector>,
    /// Circulation per section. May be empty.
    pub circulation_strength: Vec<f64>,
    /// Effective angle of attack per section, radians. May be empty.
    pub angles_of_attack: Vec<f64>,
}

impl SimulationStepResult {
    /// Summed force along +x, the ship's forward axis in the engine frame.
    pub fn thrust(&self) -> f64 {
        self.integrated_forces.iter().map(|f| f.x).sum()
    }
}

pub trait LiftingLineEngine {
    /// One point per section, in device order. Read once after build.
    fn freestream_query_points(&self) -> Vec<SpatialVector>;

    /// One value per device.
    fn set_internal_state(&mut self, values: &[f64]) -> Result<(), EngineError>;

    /// One value per device, radians.
    fn set_local_wing_angles(&mut self, angles: &[f64]) -> Result<(), EngineError>;

    /// Advance the engine by `time_step`.
    ///
    /// # Arguments
    ///
    /// * `time` - Current simulation time (seconds)
    /// * `time_step` - Step length (seconds)
    /// * `freestream_velocity` - One velocity per query point (m/s)
    fn step(
        &mut self,
        time: f64,
        time_step: f64,
        freestream_velocity: &[SpatialVector],
    ) -> Result<SimulationStepResult, EngineError>;
}

/// Builds engines from the compact JSON form of a configuration document.
///
/// Shared between the threads of a sweep, so it must be `Sync`. The engines it builds never leave
/// the thread that built them.
pub trait EngineFactory: Sync {
    type Engine: LiftingLineEngine;

    fn build(&self, configuration_json: &str) -> Result<Self::Engine, EngineError>;
}
