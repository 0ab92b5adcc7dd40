//! Sampled controller driving every device of a scenario.
//!
//! The [`Controller`] owns one [`ControlLoopState`] per device and a shared [`UpdateSchedule`].
//! Measurements are fed on every simulation step (they fill the wind-direction filter), but new
//! commands are only produced on update steps. Between updates the caller keeps the last outputs.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ControlError, ControlResult};
use crate::filter::WindDirectionFilter;
use crate::sampled::UpdateSchedule;
use crate::set_points::ControlSetPointTable;

/// Measured flow state for one device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerInput {
    /// Scales both set points, in `[0, 1]`.
    pub loading: f64,
    /// Apparent wind direction at the device, radians.
    pub apparent_wind_direction: f64,
    /// Apparent wind speed at the device, m/s.
    pub wind_speed: f64,
    /// Measured angle of attack, radians. Only used in effective-angle mode.
    pub angle_of_attack: f64,
}

impl ControllerInput {
    /// Full loading and zero measured angle of attack.
    pub fn new(apparent_wind_direction: f64, wind_speed: f64) -> Self {
        Self {
            loading: 1.0,
            apparent_wind_direction,
            wind_speed,
            angle_of_attack: 0.0,
        }
    }
}

/// Commanded state for one device.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlOutput {
    pub local_wing_angle: f64,
    pub section_model_internal_state: f64,
}

/// Per-device loop state: the control law, its last command and its input filter.
///
/// Owned by exactly one device; never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlLoopState {
    table: ControlSetPointTable,
    filter: Option<WindDirectionFilter>,
    last_output: Option<ControlOutput>,
}

impl ControlLoopState {
    /// # Errors
    ///
    /// Returns error if `moving_average_window_size` is `Some(0)`.
    pub fn new(
        table: ControlSetPointTable,
        moving_average_window_size: Option<usize>,
    ) -> ControlResult<Self> {
        let filter = moving_average_window_size
            .map(WindDirectionFilter::new)
            .transpose()?;
        Ok(Self {
            table,
            filter,
            last_output: None,
        })
    }

    pub fn table(&self) -> &ControlSetPointTable {
        &self.table
    }

    /// Output of the most recent update, `None` before the first one.
    pub fn last_output(&self) -> Option<ControlOutput> {
        self.last_output
    }

    /// Feed one measurement through the wind-direction filter.
    pub fn measure(&mut self, input: &ControllerInput) -> ControllerInput {
        match self.filter.as_mut() {
            Some(filter) => ControllerInput {
                apparent_wind_direction: filter.push(input.apparent_wind_direction),
                ..*input
            },
            None => *input,
        }
    }

    /// Evaluate the control law and remember the result for rate limiting.
    pub fn command(&mut self, input: &ControllerInput, update_interval: f64) -> ControlOutput {
        let output = self
            .table
            .evaluate(input, self.last_output.as_ref(), update_interval);
        self.last_output = Some(output);
        output
    }

    pub fn reset(&mut self) {
        self.last_output = None;
        if let Some(filter) = self.filter.as_mut() {
            filter.reset();
        }
    }
}

/// Controller for all devices of a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    loops: Vec<ControlLoopState>,
    schedule: UpdateSchedule,
}

impl Controller {
    pub fn nr_devices(&self) -> usize {
        self.loops.len()
    }

    pub fn loops(&self) -> &[ControlLoopState] {
        &self.loops
    }

    pub fn schedule(&self) -> &UpdateSchedule {
        &self.schedule
    }

    /// Process one simulation step.
    ///
    /// Returns `Some(outputs)` on update steps and `None` when the previous outputs are held.
    ///
    /// # Arguments
    ///
    /// * `time` - Current simulation time (seconds)
    /// * `time_step` - Simulation time step (seconds)
    /// * `inputs` - One measurement per device, in device order
    ///
    /// # Errors
    ///
    /// Returns error if the number of inputs does not match the number of devices.
    pub fn update(
        &mut self,
        time: f64,
        time_step: f64,
        inputs: &[ControllerInput],
    ) -> ControlResult<Option<Vec<ControlOutput>>> {
        if inputs.len() != self.loops.len() {
            return Err(ControlError::InputCount {
                expected: self.loops.len(),
                found: inputs.len(),
            });
        }

        let filtered: Vec<ControllerInput> = self
            .loops
            .iter_mut()
            .zip(inputs)
            .map(|(l, input)| l.measure(input))
            .collect();

        let update = self.schedule.should_update(time);
        let update_interval = self.schedule.update_interval(time_step);
        let step = self.schedule.step_index;
        self.schedule.advance();

        if !update {
            return Ok(None);
        }

        let outputs: Vec<ControlOutput> = self
            .loops
            .iter_mut()
            .zip(&filtered)
            .map(|(l, input)| l.command(input, update_interval))
            .collect();

        trace!(step, time, devices = outputs.len(), "controller update");
        Ok(Some(outputs))
    }

    /// Last commanded outputs, `None` for devices that have not been updated yet.
    pub fn held_outputs(&self) -> Vec<Option<ControlOutput>> {
        self.loops.iter().map(ControlLoopState::last_output).collect()
    }

    pub fn reset(&mut self) {
        self.schedule.reset();
        self.loops.iter_mut().for_each(ControlLoopState::reset);
    }
}

fn default_time_steps_between_updates() -> usize {
    1
}

/// Serializable controller settings, one set-point table per device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerBuilder {
    pub set_points: Vec<ControlSetPointTable>,
    #[serde(default = "default_time_steps_between_updates")]
    pub time_steps_between_updates: usize,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving_average_window_size: Option<usize>,
}

impl ControllerBuilder {
    /// Builder with default schedule and no smoothing.
    pub fn new(set_points: Vec<ControlSetPointTable>) -> Self {
        Self {
            set_points,
            time_steps_between_updates: default_time_steps_between_updates(),
            start_time: 0.0,
            moving_average_window_size: None,
        }
    }

    /// # Errors
    ///
    /// Returns error if there are no set points or the schedule or window is invalid.
    pub fn build(&self) -> ControlResult<Controller> {
        if self.set_points.is_empty() {
            return Err(ControlError::InvalidArg {
                what: "controller needs at least one set-point table",
            });
        }
        let schedule = UpdateSchedule::new(self.time_steps_between_updates, self.start_time)?;
        let loops = self
            .set_points
            .iter()
            .map(|t| ControlLoopState::new(t.clone(), self.moving_average_window_size))
            .collect::<ControlResult<Vec<_>>>()?;
        Ok(Controller { loops, schedule })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimit;
    use crate::set_points::InternalStateTag;

    fn ramp_table() -> ControlSetPointTable {
        ControlSetPointTable::new(
            vec![-1.0, 1.0],
            Some(vec![-1.0, 1.0]),
            Some(vec![-2.0, 2.0]),
            InternalStateTag::Generic,
            None,
        )
        .unwrap()
    }

    #[test]
    fn builder_defaults_from_json() {
        let json = r#"{"set_points": [{
            "apparent_wind_directions_data": [-1.0, 1.0],
            "angle_of_attack_data": [0.0, 0.0]
        }]}"#;
        let b: ControllerBuilder = serde_json::from_str(json).unwrap();
        assert_eq!(b.time_steps_between_updates, 1);
        assert_eq!(b.start_time, 0.0);
        assert_eq!(b.moving_average_window_size, None);
        assert_eq!(b.build().unwrap().nr_devices(), 1);
    }

    #[test]
    fn builder_rejects_unknown_fields_and_bad_settings() {
        let json = r#"{"set_points": [], "gain": 1.0}"#;
        assert!(serde_json::from_str::<ControllerBuilder>(json).is_err());

        assert!(ControllerBuilder::new(vec![]).build().is_err());
        let mut b = ControllerBuilder::new(vec![ramp_table()]);
        b.time_steps_between_updates = 0;
        assert!(b.build().is_err());
        let mut b = ControllerBuilder::new(vec![ramp_table()]);
        b.moving_average_window_size = Some(0);
        assert!(b.build().is_err());
    }

    #[test]
    fn input_count_is_checked() {
        let mut c = ControllerBuilder::new(vec![ramp_table(), ramp_table()])
            .build()
            .unwrap();
        let err = c
            .update(0.0, 0.1, &[ControllerInput::new(0.0, 5.0)])
            .unwrap_err();
        assert_eq!(
            err,
            ControlError::InputCount {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn outputs_are_held_between_updates() {
        let mut b = ControllerBuilder::new(vec![ramp_table()]);
        b.time_steps_between_updates = 2;
        let mut c = b.build().unwrap();
        let input = [ControllerInput::new(0.5, 5.0)];

        assert!(c.update(0.0, 0.1, &input).unwrap().is_some());
        assert!(c.update(0.1, 0.1, &input).unwrap().is_none());
        assert!(c.update(0.2, 0.1, &input).unwrap().is_some());
        assert_eq!(c.schedule().step_index, 3);
        assert!(c.held_outputs()[0].is_some());
    }

    #[test]
    fn rate_limit_uses_update_interval() {
        let table = ramp_table().with_rate_limits(None, Some(RateLimit::new(1.0).unwrap()));
        let mut b = ControllerBuilder::new(vec![table]);
        b.time_steps_between_updates = 2;
        let mut c = b.build().unwrap();

        let first = c
            .update(0.0, 0.1, &[ControllerInput::new(0.0, 5.0)])
            .unwrap()
            .unwrap();
        assert_eq!(first[0].section_model_internal_state, 0.0);

        c.update(0.1, 0.1, &[ControllerInput::new(1.0, 5.0)]).unwrap();
        let second = c
            .update(0.2, 0.1, &[ControllerInput::new(1.0, 5.0)])
            .unwrap()
            .unwrap();
        // 1.0 per second over two steps of 0.1 s.
        assert!((second[0].section_model_internal_state - 0.2).abs() < 1e-12);
    }

    #[test]
    fn loops_are_independent() {
        let limited = ramp_table().with_rate_limits(None, Some(RateLimit::new(0.5).unwrap()));
        let mut c = ControllerBuilder::new(vec![limited, ramp_table()])
            .build()
            .unwrap();
        let zero = ControllerInput::new(0.0, 5.0);
        c.update(0.0, 1.0, &[zero, zero]).unwrap();

        let moved = ControllerInput::new(1.0, 5.0);
        let out = c.update(1.0, 1.0, &[moved, moved]).unwrap().unwrap();
        assert!((out[0].section_model_internal_state - 0.5).abs() < 1e-12);
        assert_eq!(out[1].section_model_internal_state, 2.0);
    }

    #[test]
    fn smoothing_filters_wind_direction() {
        let mut b = ControllerBuilder::new(vec![ramp_table()]);
        b.moving_average_window_size = Some(2);
        let mut c = b.build().unwrap();
        c.update(0.0, 0.1, &[ControllerInput::new(0.0, 5.0)]).unwrap();
        let out = c
            .update(0.1, 0.1, &[ControllerInput::new(0.4, 5.0)])
            .unwrap()
            .unwrap();
        // Filtered direction 0.2 gives internal state 0.4.
        assert!((out[0].section_model_internal_state - 0.4).abs() < 1e-3);
    }

    #[test]
    fn reset_restarts_schedule_and_rate_limits() {
        let table = ramp_table().with_rate_limits(None, Some(RateLimit::new(0.1).unwrap()));
        let mut c = ControllerBuilder::new(vec![table]).build().unwrap();
        c.update(0.0, 1.0, &[ControllerInput::new(0.0, 5.0)]).unwrap();
        c.reset();
        assert_eq!(c.held_outputs(), vec![None]);
        let out = c
            .update(0.0, 1.0, &[ControllerInput::new(1.0, 5.0)])
            .unwrap()
            .unwrap();
        assert_eq!(out[0].section_model_internal_state, 2.0);
    }
}
