//! Piecewise-linear control set points keyed on apparent wind direction.
//!
//! A [`ControlSetPointTable`] maps the apparent wind direction (radians, wrapped to `[-pi, pi]`)
//! to an angle-of-attack set point and/or a section-model internal state. Between breakpoints the
//! outputs are interpolated linearly; outside the breakpoint range the boundary value is held.
//!
//! The internal state is either used as-is ([`InternalStateKind::Generic`]) or is a spin ratio
//! that is converted to rotations per second ([`InternalStateKind::SpinRatio`]).

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::de::value::MapAccessDeserializer;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sf_core::{
    TaggedUnion, deserialize_tagged, is_strictly_increasing, linear_interpolation,
    serialize_tagged, wrap_to_pi,
};

use crate::controller::{ControlOutput, ControllerInput};
use crate::error::{ControlError, ControlResult};
use crate::rate_limit::RateLimit;

/// Parameters converting a non-dimensional spin ratio into rotations per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpinRatioConversionDef", into = "SpinRatioConversionDef")]
pub struct SpinRatioConversion {
    diameter: f64,
    max_rps: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpinRatioConversionDef {
    diameter: f64,
    max_rps: f64,
}

impl SpinRatioConversion {
    /// # Errors
    ///
    /// Returns error if `diameter` or `max_rps` is not finite and positive.
    pub fn new(diameter: f64, max_rps: f64) -> ControlResult<Self> {
        if !diameter.is_finite() || diameter <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "rotor diameter must be finite and positive",
            });
        }
        if !max_rps.is_finite() || max_rps <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "max_rps must be finite and positive",
            });
        }
        Ok(Self { diameter, max_rps })
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn max_rps(&self) -> f64 {
        self.max_rps
    }

    /// Rotations per second for a commanded spin ratio at the given wind speed.
    ///
    /// `rps = -(spin_ratio * wind_speed) / (pi * diameter)`, limited in magnitude to `max_rps`.
    pub fn rps(&self, spin_ratio: f64, wind_speed: f64) -> f64 {
        let raw = -(spin_ratio * wind_speed) / (PI * self.diameter);
        if raw.abs() > self.max_rps {
            self.max_rps.copysign(raw)
        } else {
            raw
        }
    }
}

impl TryFrom<SpinRatioConversionDef> for SpinRatioConversion {
    type Error = ControlError;

    fn try_from(def: SpinRatioConversionDef) -> ControlResult<Self> {
        Self::new(def.diameter, def.max_rps)
    }
}

impl From<SpinRatioConversion> for SpinRatioConversionDef {
    fn from(c: SpinRatioConversion) -> Self {
        Self {
            diameter: c.diameter,
            max_rps: c.max_rps,
        }
    }
}

/// Tag of an [`InternalStateKind`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalStateTag {
    Generic,
    SpinRatio,
}

impl InternalStateTag {
    pub const ALL: [InternalStateTag; 2] = [InternalStateTag::Generic, InternalStateTag::SpinRatio];

    pub fn as_str(self) -> &'static str {
        match self {
            InternalStateTag::Generic => "Generic",
            InternalStateTag::SpinRatio => "SpinRatio",
        }
    }
}

impl fmt::Display for InternalStateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InternalStateTag {
    type Err = ControlError;

    fn from_str(s: &str) -> ControlResult<Self> {
        InternalStateTag::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ControlError::UnknownKind { tag: s.to_string() })
    }
}

/// How the internal-state series is interpreted.
///
/// Serializes as `"Generic"` or `{"SpinRatio": {"diameter": .., "max_rps": ..}}`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InternalStateKind {
    /// Values are used in their native unit.
    #[default]
    Generic,
    /// Values are spin ratios, converted to rotations per second.
    SpinRatio(SpinRatioConversion),
}

impl InternalStateKind {
    /// Build a kind from its tag and optional conversion payload.
    ///
    /// # Errors
    ///
    /// `SpinRatio` without conversion parameters and `Generic` with conversion parameters are
    /// both rejected.
    pub fn from_parts(
        tag: InternalStateTag,
        conversion: Option<SpinRatioConversion>,
    ) -> ControlResult<Self> {
        match (tag, conversion) {
            (InternalStateTag::Generic, None) => Ok(InternalStateKind::Generic),
            (InternalStateTag::Generic, Some(_)) => Err(ControlError::UnexpectedConversion {
                kind: InternalStateTag::Generic.as_str(),
            }),
            (InternalStateTag::SpinRatio, Some(c)) => Ok(InternalStateKind::SpinRatio(c)),
            (InternalStateTag::SpinRatio, None) => Err(ControlError::MissingConversion),
        }
    }

    pub fn tag(&self) -> InternalStateTag {
        match self {
            InternalStateKind::Generic => InternalStateTag::Generic,
            InternalStateKind::SpinRatio(_) => InternalStateTag::SpinRatio,
        }
    }

    pub fn conversion(&self) -> Option<&SpinRatioConversion> {
        match self {
            InternalStateKind::Generic => None,
            InternalStateKind::SpinRatio(c) => Some(c),
        }
    }

    /// Convert a looked-up internal state to the value sent to the section model.
    pub fn convert(&self, value: f64, wind_speed: f64) -> f64 {
        match self {
            InternalStateKind::Generic => value,
            InternalStateKind::SpinRatio(c) => c.rps(value, wind_speed),
        }
    }
}

impl TaggedUnion for InternalStateKind {
    type Payload = SpinRatioConversion;

    const NAME: &'static str = "InternalStateKind";
    const TAGS: &'static [&'static str] = &["Generic", "SpinRatio"];
    const TAG_FIELD: &'static str = "internal_state_type";
    const DATA_FIELD: &'static str = "internal_state_conversion";

    fn from_parts(tag: &str, payload: Option<SpinRatioConversion>) -> Result<Self, String> {
        let tag = InternalStateTag::from_str(tag).map_err(|e| e.to_string())?;
        InternalStateKind::from_parts(tag, payload).map_err(|e| e.to_string())
    }

    fn to_parts(&self) -> (&'static str, Option<&SpinRatioConversion>) {
        (self.tag().as_str(), self.conversion())
    }
}

impl Serialize for InternalStateKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_tagged(self, serializer)
    }
}

impl<'de> Deserialize<'de> for InternalStateKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tagged(deserializer)
    }
}

/// Result of a table lookup, before loading, conversion and rate limiting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetPointLookup {
    pub angle_of_attack: Option<f64>,
    pub internal_state: Option<f64>,
}

/// Control law for one device.
///
/// Invariants:
/// - wind-direction breakpoints are strictly increasing
/// - at least one output series is present, each matching the breakpoint count
/// - a spin-ratio internal state always carries its conversion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ControlSetPointTableDef", into = "ControlSetPointTableDef")]
pub struct ControlSetPointTable {
    wind_directions: Vec<f64>,
    angle_of_attack: Option<Vec<f64>>,
    internal_state: Option<Vec<f64>>,
    internal_state_kind: InternalStateKind,
    use_effective_angle_of_attack: bool,
    max_angle_rate: Option<RateLimit>,
    max_internal_state_rate: Option<RateLimit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ControlSetPointTableDef {
    apparent_wind_directions_data: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    angle_of_attack_data: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    section_model_internal_state_data: Option<Vec<f64>>,
    #[serde(default)]
    internal_state_type: InternalStateTypeField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    internal_state_conversion: Option<SpinRatioConversion>,
    #[serde(default)]
    use_effective_angle_of_attack: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_local_wing_angle_change_rate: Option<RateLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_internal_section_state_change_rate: Option<RateLimit>,
}

/// `internal_state_type` as written in a set-point table.
///
/// Either a full [`InternalStateKind`] (bare `"Generic"`, `{"SpinRatio": {..}}` or the
/// normalized map), or a bare tag whose conversion sits in the sibling
/// `internal_state_conversion` field.
#[derive(Debug, Clone)]
enum InternalStateTypeField {
    Tag(InternalStateTag),
    Kind(InternalStateKind),
}

impl Default for InternalStateTypeField {
    fn default() -> Self {
        InternalStateTypeField::Tag(InternalStateTag::Generic)
    }
}

impl Serialize for InternalStateTypeField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            InternalStateTypeField::Tag(tag) => serializer.serialize_str(tag.as_str()),
            InternalStateTypeField::Kind(kind) => kind.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for InternalStateTypeField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(InternalStateTypeVisitor)
    }
}

struct InternalStateTypeVisitor;

impl<'de> Visitor<'de> for InternalStateTypeVisitor {
    type Value = InternalStateTypeField;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an internal state tag or a tagged internal state kind")
    }

    fn visit_str<E: de::Error>(self, tag: &str) -> Result<Self::Value, E> {
        InternalStateTag::from_str(tag)
            .map(InternalStateTypeField::Tag)
            .map_err(E::custom)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        InternalStateKind::deserialize(MapAccessDeserializer::new(map))
            .map(InternalStateTypeField::Kind)
    }
}

impl TryFrom<ControlSetPointTableDef> for ControlSetPointTable {
    type Error = ControlError;

    fn try_from(def: ControlSetPointTableDef) -> ControlResult<Self> {
        let kind = match (def.internal_state_type, def.internal_state_conversion) {
            (InternalStateTypeField::Kind(kind), None) => kind,
            (InternalStateTypeField::Kind(_), Some(_)) => {
                return Err(ControlError::InvalidArg {
                    what: "internal_state_conversion given next to a tagged internal_state_type",
                });
            }
            (InternalStateTypeField::Tag(tag), conversion) => {
                InternalStateKind::from_parts(tag, conversion)?
            }
        };
        let table = Self::new(
            def.apparent_wind_directions_data,
            def.angle_of_attack_data,
            def.section_model_internal_state_data,
            kind.tag(),
            kind.conversion().copied(),
        )?;
        Ok(table
            .with_effective_angle_of_attack(def.use_effective_angle_of_attack)
            .with_rate_limits(
                def.max_local_wing_angle_change_rate,
                def.max_internal_section_state_change_rate,
            ))
    }
}

impl From<ControlSetPointTable> for ControlSetPointTableDef {
    fn from(t: ControlSetPointTable) -> Self {
        Self {
            apparent_wind_directions_data: t.wind_directions,
            angle_of_attack_data: t.angle_of_attack,
            section_model_internal_state_data: t.internal_state,
            internal_state_type: InternalStateTypeField::Kind(t.internal_state_kind),
            internal_state_conversion: None,
            use_effective_angle_of_attack: t.use_effective_angle_of_attack,
            max_local_wing_angle_change_rate: t.max_angle_rate,
            max_internal_section_state_change_rate: t.max_internal_state_rate,
        }
    }
}

impl ControlSetPointTable {
    /// Create a validated set-point table.
    ///
    /// # Arguments
    ///
    /// * `wind_directions` - Apparent wind direction breakpoints in radians, strictly increasing
    /// * `angle_of_attack` - Optional angle-of-attack set points in radians
    /// * `internal_state` - Optional internal-state set points
    /// * `kind` - Interpretation of the internal-state series
    /// * `conversion` - Spin-ratio conversion, required for and only for `SpinRatio`
    ///
    /// # Errors
    ///
    /// Returns error if any table invariant is violated.
    pub fn new(
        wind_directions: Vec<f64>,
        angle_of_attack: Option<Vec<f64>>,
        internal_state: Option<Vec<f64>>,
        kind: InternalStateTag,
        conversion: Option<SpinRatioConversion>,
    ) -> ControlResult<Self> {
        let internal_state_kind = InternalStateKind::from_parts(kind, conversion)?;

        if wind_directions.is_empty() {
            return Err(ControlError::InvalidArg {
                what: "set-point table needs at least one wind direction",
            });
        }
        if wind_directions.iter().any(|v| !v.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "wind directions must be finite",
            });
        }
        if !is_strictly_increasing(&wind_directions) {
            return Err(ControlError::NonMonotonicBreakpoints);
        }
        if angle_of_attack.is_none() && internal_state.is_none() {
            return Err(ControlError::NoOutputSeries);
        }
        check_series("angle_of_attack", angle_of_attack.as_deref(), wind_directions.len())?;
        check_series("internal_state", internal_state.as_deref(), wind_directions.len())?;

        Ok(Self {
            wind_directions,
            angle_of_attack,
            internal_state,
            internal_state_kind,
            use_effective_angle_of_attack: false,
            max_angle_rate: None,
            max_internal_state_rate: None,
        })
    }

    /// Use the measured angle of attack rather than the wind direction to place the wing.
    pub fn with_effective_angle_of_attack(mut self, enabled: bool) -> Self {
        self.use_effective_angle_of_attack = enabled;
        self
    }

    /// Set the rate limits for the wing angle and the internal state. `None` is unlimited.
    pub fn with_rate_limits(
        mut self,
        max_angle_rate: Option<RateLimit>,
        max_internal_state_rate: Option<RateLimit>,
    ) -> Self {
        self.max_angle_rate = max_angle_rate;
        self.max_internal_state_rate = max_internal_state_rate;
        self
    }

    pub fn wind_directions(&self) -> &[f64] {
        &self.wind_directions
    }

    pub fn angle_of_attack(&self) -> Option<&[f64]> {
        self.angle_of_attack.as_deref()
    }

    pub fn internal_state(&self) -> Option<&[f64]> {
        self.internal_state.as_deref()
    }

    pub fn internal_state_kind(&self) -> &InternalStateKind {
        &self.internal_state_kind
    }

    pub fn uses_effective_angle_of_attack(&self) -> bool {
        self.use_effective_angle_of_attack
    }

    pub fn max_angle_rate(&self) -> Option<RateLimit> {
        self.max_angle_rate
    }

    pub fn max_internal_state_rate(&self) -> Option<RateLimit> {
        self.max_internal_state_rate
    }

    /// Interpolate both series at `wind_direction`, holding boundary values outside the range.
    pub fn lookup(&self, wind_direction: f64) -> SetPointLookup {
        let at = |ys: &Vec<f64>| linear_interpolation(wind_direction, &self.wind_directions, ys);
        SetPointLookup {
            angle_of_attack: self.angle_of_attack.as_ref().map(at),
            internal_state: self.internal_state.as_ref().map(at),
        }
    }

    /// Commanded output for one update tick.
    ///
    /// `previous` is the output of the last update tick, `None` on the first one. Rate limits are
    /// applied over `update_interval` seconds, after loading and unit conversion.
    ///
    /// The wing-angle limit acts on the plain difference to the previous angle. A command that
    /// crosses `+-pi` therefore turns the long way round.
    pub fn evaluate(
        &self,
        input: &ControllerInput,
        previous: Option<&ControlOutput>,
        update_interval: f64,
    ) -> ControlOutput {
        let set_points = self.lookup(input.apparent_wind_direction);

        let mut local_wing_angle = match set_points.angle_of_attack {
            Some(aoa) => {
                let target = input.loading * aoa;
                if self.use_effective_angle_of_attack {
                    let measured = input.angle_of_attack;
                    wrap_to_pi(measured + wrap_to_pi(measured - target))
                } else {
                    input.apparent_wind_direction - target
                }
            }
            None => 0.0,
        };

        let mut section_model_internal_state = match set_points.internal_state {
            Some(state) => self
                .internal_state_kind
                .convert(input.loading * state, input.wind_speed),
            None => 0.0,
        };

        if let Some(prev) = previous {
            if let Some(limit) = self.max_angle_rate {
                local_wing_angle =
                    limit.apply(prev.local_wing_angle, local_wing_angle, update_interval);
            }
            if let Some(limit) = self.max_internal_state_rate {
                section_model_internal_state = limit.apply(
                    prev.section_model_internal_state,
                    section_model_internal_state,
                    update_interval,
                );
            }
        }

        ControlOutput {
            local_wing_angle,
            section_model_internal_state,
        }
    }

    /// Single-element wing sail: angle of attack only.
    pub fn default_wing_sail_single_element() -> Self {
        Self::preset(
            &[-180.0, -20.0, -10.0, 20.0, 30.0, 180.0],
            Some(degrees(&[-15.0, -15.0, 0.0, 0.0, 15.0, 15.0])),
            None,
            InternalStateKind::Generic,
        )
    }

    /// Two-element wing sail: angle of attack plus flap angle.
    pub fn default_wing_sail_two_element() -> Self {
        Self::preset(
            &[-180.0, -20.0, -10.0, 10.0, 20.0, 180.0],
            Some(degrees(&[-12.0, -12.0, 0.0, 0.0, 12.0, 12.0])),
            Some(degrees(&[-30.0, -30.0, 0.0, 0.0, 30.0, 30.0])),
            InternalStateKind::Generic,
        )
    }

    /// Rotor sail: spin ratio only, converted with the rotor's dimensions.
    pub fn default_rotor_sail(conversion: SpinRatioConversion) -> Self {
        Self::preset(
            &[-180.0, -40.0, -15.0, 15.0, 40.0, 180.0],
            None,
            Some(vec![3.0, 3.0, 0.0, 0.0, -3.0, -3.0]),
            InternalStateKind::SpinRatio(conversion),
        )
    }

    /// Suction sail: angle of attack plus suction coefficient.
    pub fn default_suction_sail() -> Self {
        const MAX_AOA_DEG: f64 = 30.0;
        const MAX_CA: f64 = 0.3;
        Self::preset(
            &[-180.0, -20.0, -10.0, 10.0, 20.0, 180.0],
            Some(degrees(&[-MAX_AOA_DEG, -MAX_AOA_DEG, 0.0, 0.0, MAX_AOA_DEG, MAX_AOA_DEG])),
            Some(vec![-MAX_CA, -MAX_CA, 0.0, 0.0, MAX_CA, MAX_CA]),
            InternalStateKind::Generic,
        )
    }

    fn preset(
        wind_directions_deg: &[f64],
        angle_of_attack: Option<Vec<f64>>,
        internal_state: Option<Vec<f64>>,
        internal_state_kind: InternalStateKind,
    ) -> Self {
        Self {
            wind_directions: degrees(wind_directions_deg),
            angle_of_attack,
            internal_state,
            internal_state_kind,
            use_effective_angle_of_attack: false,
            max_angle_rate: None,
            max_internal_state_rate: None,
        }
    }
}

fn degrees(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v.to_radians()).collect()
}

fn check_series(series: &'static str, values: Option<&[f64]>, expected: usize) -> ControlResult<()> {
    let Some(values) = values else {
        return Ok(());
    };
    if values.len() != expected {
        return Err(ControlError::LengthMismatch {
            series,
            expected,
            found: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ControlError::InvalidArg {
            what: "set-point values must be finite",
        });
    }
    Ok(())
}
