//! Input power models for wind propulsion devices.
//!
//! Rotor and suction sails need power to run. An [`InputPowerModel`] turns the section model's
//! internal state (rotor speed, suction coefficient) into a power coefficient and, given the local
//! flow, into the power drawn by one strip of the device.

pub mod error;
pub mod model;

pub use error::{PowerError, PowerResult};
pub use model::{
    InputPowerData, InputPowerModel, InputPowerTag, POWER_CURVE_EXPONENT, POWER_CURVE_SAMPLES,
};
