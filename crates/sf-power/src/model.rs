//! The input power model and its tabulated data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sf_core::units::{Area, AngularVelocity, Power};
use sf_core::{
    SpatialVector, TaggedUnion, deserialize_tagged, ensure_positive, is_strictly_increasing,
    linear_interpolation, linspace, serialize_tagged,
};
use tracing::debug;

use crate::error::{PowerError, PowerResult};

/// Exponent of the rotor power curve `power = factor * rps^2.5`.
pub const POWER_CURVE_EXPONENT: f64 = 2.5;

/// Number of samples emitted by [`InputPowerModel::polynomial_rotor_sail_model`].
pub const POWER_CURVE_SAMPLES: usize = 20;

/// Parallel internal-state and power-coefficient samples.
///
/// Invariants: non-empty, equal lengths, internal states strictly increasing, all finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InputPowerDataDef", into = "InputPowerDataDef")]
pub struct InputPowerData {
    section_models_internal_state_data: Vec<f64>,
    input_power_coefficient_data: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputPowerDataDef {
    section_models_internal_state_data: Vec<f64>,
    input_power_coefficient_data: Vec<f64>,
}

impl InputPowerData {
    pub fn new(
        section_models_internal_state_data: Vec<f64>,
        input_power_coefficient_data: Vec<f64>,
    ) -> PowerResult<Self> {
        if section_models_internal_state_data.is_empty() {
            return Err(PowerError::InvalidTable {
                what: "table must have at least one entry",
            });
        }
        if section_models_internal_state_data.len() != input_power_coefficient_data.len() {
            return Err(PowerError::InvalidTable {
                what: "internal state and power coefficient data must have equal length",
            });
        }
        if section_models_internal_state_data
            .iter()
            .chain(&input_power_coefficient_data)
            .any(|v| !v.is_finite())
        {
            return Err(PowerError::InvalidTable {
                what: "table values must be finite",
            });
        }
        if !is_strictly_increasing(&section_models_internal_state_data) {
            return Err(PowerError::InvalidTable {
                what: "internal state data must be strictly increasing",
            });
        }
        Ok(Self {
            section_models_internal_state_data,
            input_power_coefficient_data,
        })
    }

    pub fn internal_states(&self) -> &[f64] {
        &self.section_models_internal_state_data
    }

    pub fn power_coefficients(&self) -> &[f64] {
        &self.input_power_coefficient_data
    }

    pub fn len(&self) -> usize {
        self.section_models_internal_state_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.section_models_internal_state_data.is_empty()
    }

    /// Boundary-held interpolation at `internal_state`.
    pub fn interpolate(&self, internal_state: f64) -> f64 {
        linear_interpolation(
            internal_state,
            &self.section_models_internal_state_data,
            &self.input_power_coefficient_data,
        )
    }
}

impl TryFrom<InputPowerDataDef> for InputPowerData {
    type Error = PowerError;

    fn try_from(def: InputPowerDataDef) -> PowerResult<Self> {
        Self::new(
            def.section_models_internal_state_data,
            def.input_power_coefficient_data,
        )
    }
}

impl From<InputPowerData> for InputPowerDataDef {
    fn from(d: InputPowerData) -> Self {
        Self {
            section_models_internal_state_data: d.section_models_internal_state_data,
            input_power_coefficient_data: d.input_power_coefficient_data,
        }
    }
}

/// Variant tag of an [`InputPowerModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputPowerTag {
    NoPower,
    InternalStateAsPowerCoefficient,
    InterpolatePowerCoefficientFromInternalState,
    InterpolateFromInternalStateOnly,
}

impl InputPowerTag {
    pub const ALL: [InputPowerTag; 4] = [
        InputPowerTag::NoPower,
        InputPowerTag::InternalStateAsPowerCoefficient,
        InputPowerTag::InterpolatePowerCoefficientFromInternalState,
        InputPowerTag::InterpolateFromInternalStateOnly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InputPowerTag::NoPower => "NoPower",
            InputPowerTag::InternalStateAsPowerCoefficient => "InternalStateAsPowerCoefficient",
            InputPowerTag::InterpolatePowerCoefficientFromInternalState => {
                "InterpolatePowerCoefficientFromInternalState"
            }
            InputPowerTag::InterpolateFromInternalStateOnly => "InterpolateFromInternalStateOnly",
        }
    }

    /// Whether variants with this tag carry an [`InputPowerData`] table.
    pub fn has_table(self) -> bool {
        matches!(
            self,
            InputPowerTag::InterpolatePowerCoefficientFromInternalState
                | InputPowerTag::InterpolateFromInternalStateOnly
        )
    }
}

impl fmt::Display for InputPowerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputPowerTag {
    type Err = PowerError;

    fn from_str(s: &str) -> PowerResult<Self> {
        InputPowerTag::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PowerError::UnknownTag { tag: s.to_string() })
    }
}

/// Power drawn by a device as a function of its internal state.
///
/// Serializes externally tagged: `"NoPower"`, `"InternalStateAsPowerCoefficient"` or
/// `{"<Variant>": {"section_models_internal_state_data": [..], "input_power_coefficient_data": [..]}}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputPowerModel {
    /// The device needs no power, e.g. a wing sail.
    #[default]
    NoPower,
    /// The internal state already is an aerodynamic power coefficient (suction sails).
    InternalStateAsPowerCoefficient,
    /// Aerodynamic power coefficient interpolated from the internal state.
    InterpolatePowerCoefficientFromInternalState(InputPowerData),
    /// Power per unit area interpolated from the internal state alone, e.g. rotor rps.
    InterpolateFromInternalStateOnly(InputPowerData),
}

impl InputPowerModel {
    /// Build a model from its tag and optional table.
    ///
    /// # Errors
    ///
    /// Returns error if a table is given to a variant without one or missing from a variant
    /// that needs one.
    pub fn from_parts(tag: InputPowerTag, data: Option<InputPowerData>) -> PowerResult<Self> {
        match (tag, data) {
            (InputPowerTag::NoPower, None) => Ok(InputPowerModel::NoPower),
            (InputPowerTag::InternalStateAsPowerCoefficient, None) => {
                Ok(InputPowerModel::InternalStateAsPowerCoefficient)
            }
            (InputPowerTag::InterpolatePowerCoefficientFromInternalState, Some(d)) => {
                Ok(InputPowerModel::InterpolatePowerCoefficientFromInternalState(d))
            }
            (InputPowerTag::InterpolateFromInternalStateOnly, Some(d)) => {
                Ok(InputPowerModel::InterpolateFromInternalStateOnly(d))
            }
            (tag, Some(_)) => Err(PowerError::Payload {
                tag: tag.as_str(),
                problem: "takes no table",
            }),
            (tag, None) => Err(PowerError::Payload {
                tag: tag.as_str(),
                problem: "requires a table",
            }),
        }
    }

    pub fn tag(&self) -> InputPowerTag {
        match self {
            InputPowerModel::NoPower => InputPowerTag::NoPower,
            InputPowerModel::InternalStateAsPowerCoefficient => {
                InputPowerTag::InternalStateAsPowerCoefficient
            }
            InputPowerModel::InterpolatePowerCoefficientFromInternalState(_) => {
                InputPowerTag::InterpolatePowerCoefficientFromInternalState
            }
            InputPowerModel::InterpolateFromInternalStateOnly(_) => {
                InputPowerTag::InterpolateFromInternalStateOnly
            }
        }
    }

    pub fn data(&self) -> Option<&InputPowerData> {
        match self {
            InputPowerModel::NoPower | InputPowerModel::InternalStateAsPowerCoefficient => None,
            InputPowerModel::InterpolatePowerCoefficientFromInternalState(d)
            | InputPowerModel::InterpolateFromInternalStateOnly(d) => Some(d),
        }
    }

    /// Power coefficient at the given internal state.
    ///
    /// Table variants look up `|internal_state|`, so both spin directions draw the same power.
    pub fn power_coefficient(&self, internal_state: f64) -> f64 {
        match self {
            InputPowerModel::NoPower => 0.0,
            InputPowerModel::InternalStateAsPowerCoefficient => internal_state,
            InputPowerModel::InterpolatePowerCoefficientFromInternalState(d)
            | InputPowerModel::InterpolateFromInternalStateOnly(d) => {
                d.interpolate(internal_state.abs())
            }
        }
    }

    /// Power in watts drawn by one strip of area `strip_area` in the local flow `velocity`.
    ///
    /// `InterpolateFromInternalStateOnly` ignores the flow: its table holds power per unit area.
    /// The aerodynamic variants scale the coefficient by `q * area * |V|`.
    pub fn input_power(
        &self,
        internal_state: f64,
        strip_area: f64,
        density: f64,
        velocity: SpatialVector,
    ) -> f64 {
        let cp = self.power_coefficient(internal_state);
        match self {
            InputPowerModel::NoPower => 0.0,
            InputPowerModel::InterpolateFromInternalStateOnly(_) => cp * strip_area,
            InputPowerModel::InternalStateAsPowerCoefficient
            | InputPowerModel::InterpolatePowerCoefficientFromInternalState(_) => {
                let dynamic_pressure = 0.5 * density * velocity.length_squared();
                cp * dynamic_pressure * strip_area * velocity.length()
            }
        }
    }

    /// Rotor power curve `power = factor * rps^2.5`, scaled to reach `max_power` at `max_rps`.
    ///
    /// # Arguments
    ///
    /// * `max_power` - Nominal power at full speed (W)
    /// * `max_rps` - Maximum rotations per second
    /// * `area` - Projected rotor area, diameter times height (m^2)
    ///
    /// # Errors
    ///
    /// Returns error if any argument is not finite and positive.
    pub fn polynomial_rotor_sail_model(max_power: f64, max_rps: f64, area: f64) -> PowerResult<Self> {
        ensure_positive(max_power, "max_power")?;
        ensure_positive(max_rps, "max_rps")?;
        ensure_positive(area, "area")?;

        let factor = max_power / (max_rps.powf(POWER_CURVE_EXPONENT) * area);
        let internal_states = linspace(0.0, max_rps, POWER_CURVE_SAMPLES);
        let coefficients = internal_states
            .iter()
            .map(|rps| factor * rps.powf(POWER_CURVE_EXPONENT))
            .collect();

        debug!(max_power, max_rps, area, factor, "rotor power curve");
        Ok(InputPowerModel::InterpolateFromInternalStateOnly(
            InputPowerData::new(internal_states, coefficients)?,
        ))
    }

    /// [`Self::polynomial_rotor_sail_model`] with dimensioned arguments.
    pub fn polynomial_rotor_sail_model_si(
        max_power: Power,
        max_speed: AngularVelocity,
        area: Area,
    ) -> PowerResult<Self> {
        use uom::si::angular_velocity::revolution_per_second;
        use uom::si::area::square_meter;
        use uom::si::power::watt;

        Self::polynomial_rotor_sail_model(
            max_power.get::<watt>(),
            max_speed.get::<revolution_per_second>(),
            area.get::<square_meter>(),
        )
    }
}

impl TaggedUnion for InputPowerModel {
    type Payload = InputPowerData;

    const NAME: &'static str = "InputPowerModel";
    const TAGS: &'static [&'static str] = &[
        "NoPower",
        "InternalStateAsPowerCoefficient",
        "InterpolatePowerCoefficientFromInternalState",
        "InterpolateFromInternalStateOnly",
    ];
    const TAG_FIELD: &'static str = "input_power_type";
    const DATA_FIELD: &'static str = "input_power_data";

    fn from_parts(tag: &str, payload: Option<InputPowerData>) -> Result<Self, String> {
        let tag = InputPowerTag::from_str(tag).map_err(|e| e.to_string())?;
        InputPowerModel::from_parts(tag, payload).map_err(|e| e.to_string())
    }

    fn to_parts(&self) -> (&'static str, Option<&InputPowerData>) {
        (self.tag().as_str(), self.data())
    }
}

impl Serialize for InputPowerModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_tagged(self, serializer)
    }
}

impl<'de> Deserialize<'de> for InputPowerModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tagged(deserializer)
    }
}
