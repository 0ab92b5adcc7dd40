//! Update scheduling for the sampled controller.
//!
//! The controller runs on a step counter rather than a clock: it updates on the very first
//! step, then every `time_steps_between_updates` steps once the simulation time has reached
//! `start_time`. Between updates the previous outputs are held.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Step-based update schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSchedule {
    /// Steps between controller updates, at least 1.
    pub time_steps_between_updates: usize,
    /// Simulation time before which only the first step updates.
    pub start_time: f64,
    /// Index of the next step.
    pub step_index: usize,
}

impl UpdateSchedule {
    /// Create a schedule positioned at step zero.
    ///
    /// # Errors
    ///
    /// Returns error if `time_steps_between_updates` is zero or `start_time` is not finite.
    pub fn new(time_steps_between_updates: usize, start_time: f64) -> ControlResult<Self> {
        if time_steps_between_updates == 0 {
            return Err(ControlError::InvalidArg {
                what: "time_steps_between_updates must be at least 1",
            });
        }
        if !start_time.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "start_time must be finite",
            });
        }
        Ok(Self {
            time_steps_between_updates,
            start_time,
            step_index: 0,
        })
    }

    /// Whether the current step is an update step at simulation time `time`.
    pub fn should_update(&self, time: f64) -> bool {
        let first_step = self.step_index == 0;
        let on_period = self.step_index % self.time_steps_between_updates == 0;
        first_step || (on_period && time >= self.start_time)
    }

    /// Move to the next step.
    pub fn advance(&mut self) {
        self.step_index += 1;
    }

    /// Time between two updates, for a simulation step of `time_step` seconds.
    pub fn update_interval(&self, time_step: f64) -> f64 {
        self.time_steps_between_updates as f64 * time_step
    }

    pub fn reset(&mut self) {
        self.step_index = 0;
    }
}
