//! Direct aerodynamic estimates for rotating-cylinder wind propulsion devices.
//!
//! This crate covers the path that works without the external lifting-line engine:
//! - [`coefficients`]: empirical polynomial lift/drag coefficients over the spin ratio
//! - [`table`]: tabulated lift coefficients handed to the engine as a section model
//! - [`forces`]: resolving coefficients into ship-frame forward/lateral forces
//! - [`wind`]: the two wind-angle conventions (direct estimate vs. engine freestream)
//! - [`telemetry`]: column naming conventions for logged rotor data

pub mod coefficients;
pub mod error;
pub mod forces;
pub mod table;
pub mod telemetry;
pub mod wind;

pub use coefficients::{CoefficientModel, TilligModel};
pub use error::{AeroError, AeroResult};
pub use forces::{
    DomainWarning, ForceEstimate, ForceResolver, MAX_SPIN_RATIO, MIN_WIND_SPEED, WindSample,
};
pub use table::CoefficientTable;
pub use telemetry::{ForceColumn, RotorColumn, TelemetryFrame};
pub use wind::{ApparentWind, apparent_wind, engine_freestream, uniform_freestream};
