//! Scenario driver: one engine, one controller, strictly sequential steps.
//!
//! Each step the driver
//! 1. feeds the controller the wind and the angles of attack measured on the previous step,
//! 2. pushes new wing angles and internal states to the engine when the controller updated,
//! 3. steps the engine with the freestream at every query point (engine convention),
//! 4. records forces, held commands and input power on decimated steps.
//!
//! Independent scenarios share nothing and run in parallel in [`run_sweep`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sf_aero::wind::control_law_wind_direction;
use sf_aero::{apparent_wind, uniform_freestream};
use sf_controls::{ControlOutput, Controller, ControllerInput};
use sf_core::units::constants::AIR_DENSITY_KG_M3;
use sf_core::{SpatialVector, linspace};
use sf_power::InputPowerModel;
use sf_project::{ConfigurationDocument, to_json_string};
use tracing::{debug, info};

use crate::engine::{EngineFactory, LiftingLineEngine};
use crate::error::{SimError, SimResult};

/// Uniform apparent wind over every device, ship convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindCondition {
    /// m/s
    pub wind_speed: f64,
    /// Radians, 0 = from dead ahead.
    pub apparent_wind_angle: f64,
}

impl WindCondition {
    pub fn new(wind_speed: f64, apparent_wind_angle: f64) -> Self {
        Self {
            wind_speed,
            apparent_wind_angle,
        }
    }

    /// Apparent wind for a ship making `ship_speed` through a true wind.
    pub fn from_true_wind(true_wind_speed: f64, true_wind_direction: f64, ship_speed: f64) -> Self {
        let apparent = apparent_wind(true_wind_speed, true_wind_direction, ship_speed);
        Self::new(apparent.speed, apparent.angle)
    }

    fn validate(&self) -> SimResult<()> {
        if !(self.wind_speed.is_finite() && self.wind_speed >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "wind_speed must be finite and non-negative",
            });
        }
        if !self.apparent_wind_angle.is_finite() {
            return Err(SimError::InvalidArg {
                what: "apparent_wind_angle must be finite",
            });
        }
        Ok(())
    }
}

fn default_loading() -> f64 {
    1.0
}

fn default_density() -> f64 {
    AIR_DENSITY_KG_M3
}

/// Operating point of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub wind: WindCondition,
    /// Controller loading in `[0, 1]`, applied to every device.
    #[serde(default = "default_loading")]
    pub loading: f64,
    /// Air density (kg/m^3), used for input power.
    #[serde(default = "default_density")]
    pub density: f64,
}

impl Scenario {
    /// Full loading in standard air.
    pub fn new(wind: WindCondition) -> Self {
        Self {
            wind,
            loading: default_loading(),
            density: default_density(),
        }
    }

    pub fn with_loading(mut self, loading: f64) -> Self {
        self.loading = loading;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    fn validate(&self) -> SimResult<()> {
        self.wind.validate()?;
        if !(0.0..=1.0).contains(&self.loading) {
            return Err(SimError::InvalidArg {
                what: "loading must be in [0, 1]",
            });
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(SimError::InvalidArg {
                what: "density must be finite and positive",
            });
        }
        Ok(())
    }
}

/// Options for scenario runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Number of engine steps
    pub n_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 0.1,
            n_steps: 200,
            record_every: 1,
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if self.n_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "n_steps must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        Ok(())
    }
}

/// State of the scenario after one recorded step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepSnapshot {
    /// Engine frame, one per device (N).
    pub integrated_forces: Vec<SpatialVector>,
    /// Commands in force during the step, one per device.
    pub controls: Vec<ControlOutput>,
    /// Summed over every device (W).
    pub input_power: f64,
}

impl StepSnapshot {
    /// Summed force along +x. The engine freestream blows a head wind towards -x, so +x is ahead.
    pub fn thrust(&self) -> f64 {
        self.integrated_forces.iter().map(|f| f.x).sum()
    }
}

/// Record of one scenario run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimRecord {
    /// Step times (seconds)
    pub t: Vec<f64>,
    pub snapshots: Vec<StepSnapshot>,
}

impl SimRecord {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Mean of `f` over the second half of the record, once the wake has developed.
    ///
    /// Zero for an empty record.
    pub fn settled_mean(&self, f: impl Fn(&StepSnapshot) -> f64) -> f64 {
        let tail = &self.snapshots[self.snapshots.len() / 2..];
        if tail.is_empty() {
            return 0.0;
        }
        tail.iter().map(f).sum::<f64>() / tail.len() as f64
    }
}

#[derive(Debug, Clone)]
struct DeviceLayout {
    strip_areas: Vec<f64>,
    input_power_model: InputPowerModel,
}

/// Drives one engine instance through one scenario at a time.
pub struct ScenarioRunner<E> {
    engine: E,
    controller: Controller,
    devices: Vec<DeviceLayout>,
    nr_query_points: usize,
}

impl<E: LiftingLineEngine> ScenarioRunner<E> {
    /// Validate `document`, build its controller and an engine from its wire form.
    ///
    /// # Errors
    ///
    /// Returns error if the document is invalid, the engine fails to build, or the engine reports
    /// a query point count different from the number of strips in the document.
    pub fn build<F>(document: &ConfigurationDocument, factory: &F) -> SimResult<Self>
    where
        F: EngineFactory<Engine = E> + ?Sized,
    {
        let controller = document.build_controller()?;
        let json = to_json_string(document)?;
        let engine = factory.build(&json).map_err(SimError::Engine)?;

        let devices: Vec<DeviceLayout> = document
            .wings
            .iter()
            .map(|w| DeviceLayout {
                strip_areas: w.geometry.strip_areas(),
                input_power_model: w.input_power_model.clone(),
            })
            .collect();

        let nr_sections: usize = devices.iter().map(|d| d.strip_areas.len()).sum();
        let nr_query_points = engine.freestream_query_points().len();
        if nr_query_points != nr_sections {
            return Err(SimError::EngineShape {
                what: "freestream query points",
                expected: nr_sections,
                found: nr_query_points,
            });
        }

        info!(
            devices = devices.len(),
            query_points = nr_query_points,
            "engine built"
        );
        Ok(Self {
            engine,
            controller,
            devices,
            nr_query_points,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn nr_devices(&self) -> usize {
        self.devices.len()
    }

    /// Run `opts.n_steps` steps of `scenario` from `t = 0`.
    ///
    /// The controller starts afresh; the engine keeps whatever wake it has from earlier runs.
    ///
    /// # Errors
    ///
    /// Returns error on invalid options or scenario, on an engine failure (passed through
    /// unmodified), or when the engine returns per-device or per-section data of the wrong length.
    pub fn run(&mut self, scenario: &Scenario, opts: &SimOptions) -> SimResult<SimRecord> {
        opts.validate()?;
        scenario.validate()?;
        self.controller.reset();

        let nr_devices = self.devices.len();
        let wind = scenario.wind;
        let freestream = uniform_freestream(
            wind.wind_speed,
            wind.apparent_wind_angle,
            self.nr_query_points,
        );
        let direction = control_law_wind_direction(wind.apparent_wind_angle);

        let mut controls = vec![ControlOutput::default(); nr_devices];
        let mut measured_aoa = vec![0.0; nr_devices];
        let mut record = SimRecord::default();

        for step in 0..opts.n_steps {
            let time = step as f64 * opts.dt;

            let inputs: Vec<ControllerInput> = measured_aoa
                .iter()
                .map(|&angle_of_attack| ControllerInput {
                    loading: scenario.loading,
                    apparent_wind_direction: direction,
                    wind_speed: wind.wind_speed,
                    angle_of_attack,
                })
                .collect();

            if let Some(outputs) = self.controller.update(time, opts.dt, &inputs)? {
                let angles: Vec<f64> = outputs.iter().map(|o| o.local_wing_angle).collect();
                let states: Vec<f64> = outputs
                    .iter()
                    .map(|o| o.section_model_internal_state)
                    .collect();
                self.engine
                    .set_local_wing_angles(&angles)
                    .map_err(SimError::Engine)?;
                self.engine
                    .set_internal_state(&states)
                    .map_err(SimError::Engine)?;
                controls = outputs;
            }

            let result = self
                .engine
                .step(time, opts.dt, &freestream)
                .map_err(SimError::Engine)?;
            if result.integrated_forces.len() != nr_devices {
                return Err(SimError::EngineShape {
                    what: "integrated forces",
                    expected: nr_devices,
                    found: result.integrated_forces.len(),
                });
            }
            measured_aoa = self.mean_angles_of_attack(&result.angles_of_attack)?;

            if (step + 1) % opts.record_every == 0 || step + 1 == opts.n_steps {
                let input_power = self.input_power(&controls, scenario.density, &freestream);
                record.t.push(time);
                record.snapshots.push(StepSnapshot {
                    integrated_forces: result.integrated_forces,
                    controls: controls.clone(),
                    input_power,
                });
            }
        }

        Ok(record)
    }

    /// Per-device mean of the per-section angles of attack. Zero when the engine reports none.
    fn mean_angles_of_attack(&self, per_section: &[f64]) -> SimResult<Vec<f64>> {
        if per_section.is_empty() {
            return Ok(vec![0.0; self.devices.len()]);
        }
        if per_section.len() != self.nr_query_points {
            return Err(SimError::EngineShape {
                what: "angles of attack",
                expected: self.nr_query_points,
                found: per_section.len(),
            });
        }

        let mut offset = 0;
        Ok(self
            .devices
            .iter()
            .map(|d| {
                let n = d.strip_areas.len();
                let sections = &per_section[offset..offset + n];
                offset += n;
                sections.iter().sum::<f64>() / n as f64
            })
            .collect())
    }

    fn input_power(&self, controls: &[ControlOutput], density: f64, freestream: &[SpatialVector]) -> f64 {
        let mut offset = 0;
        let mut total = 0.0;
        for (device, control) in self.devices.iter().zip(controls) {
            for (area, velocity) in device.strip_areas.iter().zip(&freestream[offset..]) {
                total += device.input_power_model.input_power(
                    control.section_model_internal_state,
                    *area,
                    density,
                    *velocity,
                );
            }
            offset += device.strip_areas.len();
        }
        total
    }
}

/// Run independent scenarios in parallel, one freshly built engine each.
///
/// Results come back in the order of `scenarios`.
pub fn run_sweep<F>(
    document: &ConfigurationDocument,
    factory: &F,
    scenarios: &[Scenario],
    opts: &SimOptions,
) -> Vec<SimResult<SimRecord>>
where
    F: EngineFactory,
{
    debug!(scenarios = scenarios.len(), n_steps = opts.n_steps, "scenario sweep");
    scenarios
        .par_iter()
        .map(|scenario| {
            let mut runner = ScenarioRunner::build(document, factory)?;
            runner.run(scenario, opts)
        })
        .collect()
}

/// Best controller loading found by [`optimal_loading`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadingOptimum {
    pub loading: f64,
    /// Settled thrust (N)
    pub thrust: f64,
    /// Settled input power (W)
    pub input_power: f64,
    /// `thrust * ship_speed - input_power` (W)
    pub net_power: f64,
}

/// Sweep `n_loadings` loadings evenly spaced over `[0.1, 1]` and keep the highest net power.
///
/// A single loading means full loading.
///
/// # Errors
///
/// Returns error if `n_loadings` is zero, `ship_speed` is negative or not finite, or any of the
/// runs fails.
pub fn optimal_loading<F>(
    document: &ConfigurationDocument,
    factory: &F,
    wind: WindCondition,
    ship_speed: f64,
    n_loadings: usize,
    opts: &SimOptions,
) -> SimResult<LoadingOptimum>
where
    F: EngineFactory,
{
    if n_loadings == 0 {
        return Err(SimError::InvalidArg {
            what: "n_loadings must be positive",
        });
    }
    if !(ship_speed.is_finite() && ship_speed >= 0.0) {
        return Err(SimError::InvalidArg {
            what: "ship_speed must be finite and non-negative",
        });
    }

    let loadings = if n_loadings == 1 {
        vec![1.0]
    } else {
        linspace(0.1, 1.0, n_loadings)
    };
    let scenarios: Vec<Scenario> = loadings
        .iter()
        .map(|&loading| Scenario::new(wind).with_loading(loading))
        .collect();

    let records = run_sweep(document, factory, &scenarios, opts)
        .into_iter()
        .collect::<SimResult<Vec<_>>>()?;

    let best = loadings
        .iter()
        .zip(&records)
        .map(|(&loading, record)| {
            let thrust = record.settled_mean(StepSnapshot::thrust);
            let input_power = record.settled_mean(|s| s.input_power);
            LoadingOptimum {
                loading,
                thrust,
                input_power,
                net_power: thrust * ship_speed - input_power,
            }
        })
        .max_by(|a, b| a.net_power.total_cmp(&b.net_power))
        .ok_or(SimError::InvalidArg {
            what: "no loadings evaluated",
        })?;

    debug!(
        loading = best.loading,
        net_power = best.net_power,
        "optimal loading"
    );
    Ok(best)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn settled_mean_stays_within_the_tail(forces in prop::collection::vec(-1e4f64..1e4, 1..40)) {
            let record = SimRecord {
                t: (0..forces.len()).map(|i| i as f64).collect(),
                snapshots: forces
                    .iter()
                    .map(|&fx| StepSnapshot {
                        integrated_forces: vec![SpatialVector::new(fx, 0.0, 0.0)],
                        controls: Vec::new(),
                        input_power: 0.0,
                    })
                    .collect(),
            };
            let tail = &forces[forces.len() / 2..];
            let lo = tail.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = tail.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = record.settled_mean(StepSnapshot::thrust);
            prop_assert!(mean >= lo - 1e-9 && mean <= hi + 1e-9);
        }

        #[test]
        fn still_ship_sees_the_true_wind_speed(
            speed in 0.0f64..30.0,
            direction in -3.1f64..3.1,
        ) {
            let w = WindCondition::from_true_wind(speed, direction, 0.0);
            prop_assert!((w.wind_speed - speed).abs() <= 1e-9 * speed.max(1.0));
        }
    }
}
