//! Quick setup of typical sails from a handful of dimensions.
//!
//! [`SimpleSailSetup`] stores typical settings per sail type and turns them into a wing
//! definition plus its control set points.

use serde::{Deserialize, Serialize};
use sf_aero::CoefficientTable;
use sf_controls::{ControlSetPointTable, SpinRatioConversion};
use sf_core::units::{kw, m2, rpm, to_rps};
use sf_core::{SpatialVector, linear_interpolation};
use sf_power::InputPowerModel;

use crate::ProjectResult;
use crate::schema::{DeviceGeometry, SectionModel, WingDefinition};
use crate::validate::ValidationError;

/// Public rotor sail reference data, keyed on diameter.
const ROTOR_DIAMETER_M: [f64; 2] = [4.0, 5.0];
const ROTOR_MAX_RPM: [f64; 2] = [255.0, 180.0];
const ROTOR_NOMINAL_POWER_KW: [f64; 2] = [100.0, 175.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SailType {
    WingSailSingleElement,
    WingSailTwoElement,
    RotorSail,
    SuctionSail,
}

impl SailType {
    pub fn consumes_power(self) -> bool {
        match self {
            SailType::RotorSail | SailType::SuctionSail => true,
            SailType::WingSailSingleElement | SailType::WingSailTwoElement => false,
        }
    }
}

/// A vertical sail of constant chord standing at `position`.
///
/// For rotor sails the chord length is the rotor diameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimpleSailSetup {
    #[serde(default)]
    pub position: SpatialVector,
    pub chord_length: f64,
    pub height: f64,
    pub sail_type: SailType,
}

impl SimpleSailSetup {
    pub fn new(position: SpatialVector, chord_length: f64, height: f64, sail_type: SailType) -> Self {
        Self {
            position,
            chord_length,
            height,
            sail_type,
        }
    }

    pub fn area(&self) -> f64 {
        self.chord_length * self.height
    }

    pub fn geometry(&self) -> Result<DeviceGeometry, ValidationError> {
        if !(self.chord_length.is_finite() && self.chord_length > 0.0) {
            return Err(invalid("chord_length", self.chord_length));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(invalid("height", self.height));
        }
        DeviceGeometry::straight(self.position, self.chord_length, self.height)
    }

    pub fn section_model(&self) -> SectionModel {
        match self.sail_type {
            SailType::WingSailSingleElement => SectionModel::WingSailSingleElement,
            SailType::WingSailTwoElement => SectionModel::WingSailTwoElement,
            SailType::RotorSail => SectionModel::RotatingCylinder(CoefficientTable::default_rotor_sail()),
            SailType::SuctionSail => SectionModel::SuctionSail,
        }
    }

    /// Maximum rotor speed interpolated from the reference data, in rotations per second.
    pub fn rotor_max_rps(&self) -> f64 {
        let max_rpm = linear_interpolation(self.chord_length, &ROTOR_DIAMETER_M, &ROTOR_MAX_RPM);
        to_rps(rpm(max_rpm))
    }

    pub fn input_power_model(&self) -> ProjectResult<InputPowerModel> {
        match self.sail_type {
            SailType::RotorSail => {
                let nominal_kw =
                    linear_interpolation(self.chord_length, &ROTOR_DIAMETER_M, &ROTOR_NOMINAL_POWER_KW);
                let max_rpm =
                    linear_interpolation(self.chord_length, &ROTOR_DIAMETER_M, &ROTOR_MAX_RPM);
                Ok(InputPowerModel::polynomial_rotor_sail_model_si(
                    kw(nominal_kw),
                    rpm(max_rpm),
                    m2(self.area()),
                )?)
            }
            SailType::SuctionSail => Ok(InputPowerModel::InternalStateAsPowerCoefficient),
            SailType::WingSailSingleElement | SailType::WingSailTwoElement => {
                Ok(InputPowerModel::NoPower)
            }
        }
    }

    pub fn controller_set_points(&self) -> ProjectResult<ControlSetPointTable> {
        Ok(match self.sail_type {
            SailType::WingSailSingleElement => ControlSetPointTable::default_wing_sail_single_element(),
            SailType::WingSailTwoElement => ControlSetPointTable::default_wing_sail_two_element(),
            SailType::RotorSail => {
                let conversion = SpinRatioConversion::new(self.chord_length, self.rotor_max_rps())?;
                ControlSetPointTable::default_rotor_sail(conversion)
            }
            SailType::SuctionSail => ControlSetPointTable::default_suction_sail(),
        })
    }

    pub fn wing_definition(&self) -> ProjectResult<WingDefinition> {
        Ok(WingDefinition {
            geometry: self.geometry()?,
            section_model: self.section_model(),
            input_power_model: self.input_power_model()?,
        })
    }
}

fn invalid(field: &str, value: f64) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: "must be finite and positive".to_string(),
    }
}

/// `n` rotors on a line along y, centred on the origin, `diameter * spacing_factor` apart.
pub fn rotor_positions(n: usize, diameter: f64, spacing_factor: f64) -> Vec<SpatialVector> {
    let spacing = diameter * spacing_factor;
    let center_offset = n.saturating_sub(1) as f64 * spacing / 2.0;
    (0..n)
        .map(|i| SpatialVector::new(0.0, i as f64 * spacing - center_offset, 0.0))
        .collect()
}
