//! Stand-in engine: one query point per strip, force along +x proportional to |internal state|.

#![allow(dead_code)]

use sf_core::SpatialVector;
use sf_sim::{EngineError, EngineFactory, LiftingLineEngine, SimulationStepResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetInternalState(Vec<f64>),
    SetWingAngles(Vec<f64>),
    Step { time: f64, freestream: Vec<SpatialVector> },
}

pub struct MockEngine {
    query_points: Vec<SpatialVector>,
    nr_devices: usize,
    internal_state: Vec<f64>,
    thrust_per_state: f64,
    fail_at: Option<f64>,
    pub calls: Vec<Call>,
}

impl LiftingLineEngine for MockEngine {
    fn freestream_query_points(&self) -> Vec<SpatialVector> {
        self.query_points.clone()
    }

    fn set_internal_state(&mut self, values: &[f64]) -> Result<(), EngineError> {
        self.internal_state = values.to_vec();
        self.calls.push(Call::SetInternalState(values.to_vec()));
        Ok(())
    }

    fn set_local_wing_angles(&mut self, angles: &[f64]) -> Result<(), EngineError> {
        self.calls.push(Call::SetWingAngles(angles.to_vec()));
        Ok(())
    }

    fn step(
        &mut self,
        time: f64,
        _time_step: f64,
        freestream_velocity: &[SpatialVector],
    ) -> Result<SimulationStepResult, EngineError> {
        if self.fail_at.is_some_and(|t| time >= t) {
            return Err("wake solver diverged".into());
        }
        self.calls.push(Call::Step {
            time,
            freestream: freestream_velocity.to_vec(),
        });

        let mut forces = vec![SpatialVector::ZERO; self.nr_devices];
        for (force, state) in forces.iter_mut().zip(&self.internal_state) {
            force.x = self.thrust_per_state * state.abs();
        }
        Ok(SimulationStepResult {
            integrated_forces: forces,
            circulation_strength: vec![1.0; self.query_points.len()],
            angles_of_attack: vec![0.05; self.query_points.len()],
        })
    }
}

#[derive(Default)]
pub struct MockFactory {
    pub thrust_per_state: f64,
    pub fail_at: Option<f64>,
    /// Report one query point less than there are strips.
    pub drop_query_point: bool,
}

impl EngineFactory for MockFactory {
    type Engine = MockEngine;

    fn build(&self, configuration_json: &str) -> Result<MockEngine, EngineError> {
        let document = sf_project::from_json_str(configuration_json)?;
        let mut query_points: Vec<SpatialVector> = document
            .wings
            .iter()
            .flat_map(|w| {
                w.geometry
                    .section_points()
                    .windows(2)
                    .map(|p| 0.5 * (p[0] + p[1]))
                    .collect::<Vec<_>>()
            })
            .collect();
        if self.drop_query_point {
            query_points.pop();
        }
        Ok(MockEngine {
            query_points,
            nr_devices: document.nr_wings(),
            internal_state: vec![0.0; document.nr_wings()],
            thrust_per_state: self.thrust_per_state,
            fail_at: self.fail_at,
            calls: Vec::new(),
        })
    }
}
