//! Control laws for wind propulsion devices.
//!
//! A device is driven by a piecewise-linear set-point table keyed on the apparent wind direction.
//! The table commands a wing angle (through an angle-of-attack set point) and/or a section-model
//! internal state (flap angle, suction coefficient, rotor spin ratio...).
//!
//! # Architecture
//!
//! - [`set_points`]: the table, its unit conversion and the pure evaluation function
//! - [`rate_limit`]: bounding the change between two commanded values
//! - [`filter`]: moving-average smoothing of the measured wind direction
//! - [`sampled`]: when the controller is allowed to update
//! - [`controller`]: one control loop per device plus the shared update schedule
//!
//! Evaluation is pure. The only mutable state is each loop's last commanded value and filter
//! window, owned by that loop and never shared between devices.

pub mod controller;
pub mod error;
pub mod filter;
pub mod rate_limit;
pub mod sampled;
pub mod set_points;

pub use controller::{
    ControlLoopState, ControlOutput, Controller, ControllerBuilder, ControllerInput,
};
pub use error::{ControlError, ControlResult};
pub use filter::{MovingAverage, WindDirectionFilter};
pub use rate_limit::{RateLimit, limit_change};
pub use sampled::UpdateSchedule;
pub use set_points::{
    ControlSetPointTable, InternalStateKind, InternalStateTag, SetPointLookup, SpinRatioConversion,
};
