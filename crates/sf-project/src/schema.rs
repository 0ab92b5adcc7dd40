//! Configuration document schema.
//!
//! The document is consumed verbatim by the lifting-line engine, so field names, nesting and the
//! tagged-union encodings follow the engine's wire format. Unknown fields are rejected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sf_aero::CoefficientTable;
use sf_controls::{Controller, ControllerBuilder};
use sf_core::{SpatialVector, TaggedUnion, deserialize_tagged, serialize_tagged};
use sf_power::InputPowerModel;

use crate::sail::SimpleSailSetup;
use crate::validate::ValidationError;
use crate::{ProjectResult, validate_document};

/// Discretised span line of one device, from root to tip.
///
/// Invariants: at least two points, one chord vector per point, all finite, non-zero chords and
/// no zero-length segments.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceGeometry {
    section_points: Vec<SpatialVector>,
    chord_vectors: Vec<SpatialVector>,
    non_zero_circulation_at_ends: [bool; 2],
}

impl DeviceGeometry {
    pub fn new(
        section_points: Vec<SpatialVector>,
        chord_vectors: Vec<SpatialVector>,
        non_zero_circulation_at_ends: [bool; 2],
    ) -> Result<Self, ValidationError> {
        if section_points.len() < 2 {
            return Err(ValidationError::Geometry {
                what: "a device needs at least two section points",
            });
        }
        if section_points.len() != chord_vectors.len() {
            return Err(ValidationError::CountMismatch {
                what: "chord_vectors",
                expected: section_points.len(),
                found: chord_vectors.len(),
            });
        }
        if !section_points.iter().chain(&chord_vectors).all(|v| v.is_finite()) {
            return Err(ValidationError::Geometry {
                what: "section points and chord vectors must be finite",
            });
        }
        if chord_vectors.iter().any(|c| c.length() <= 0.0) {
            return Err(ValidationError::Geometry {
                what: "chord vectors must have non-zero length",
            });
        }
        if section_points.windows(2).any(|w| (w[1] - w[0]).length() <= 0.0) {
            return Err(ValidationError::Geometry {
                what: "consecutive section points must differ",
            });
        }
        Ok(Self {
            section_points,
            chord_vectors,
            non_zero_circulation_at_ends,
        })
    }

    /// Single vertical segment of height `height` above `base` with a constant chord along +x.
    pub fn straight(
        base: SpatialVector,
        chord_length: f64,
        height: f64,
    ) -> Result<Self, ValidationError> {
        let tip = base + SpatialVector::new(0.0, 0.0, height);
        let chord = SpatialVector::new(chord_length, 0.0, 0.0);
        Self::new(vec![base, tip], vec![chord, chord], [false, false])
    }

    pub fn section_points(&self) -> &[SpatialVector] {
        &self.section_points
    }

    pub fn chord_vectors(&self) -> &[SpatialVector] {
        &self.chord_vectors
    }

    pub fn non_zero_circulation_at_ends(&self) -> [bool; 2] {
        self.non_zero_circulation_at_ends
    }

    pub fn nr_strips(&self) -> usize {
        self.section_points.len() - 1
    }

    /// Projected area of every strip: segment length times mean chord length.
    pub fn strip_areas(&self) -> Vec<f64> {
        self.section_points
            .windows(2)
            .zip(self.chord_vectors.windows(2))
            .map(|(p, c)| (p[1] - p[0]).length() * 0.5 * (c[0].length() + c[1].length()))
            .collect()
    }

    pub fn span_length(&self) -> f64 {
        self.section_points
            .windows(2)
            .map(|p| (p[1] - p[0]).length())
            .sum()
    }

    pub fn projected_area(&self) -> f64 {
        self.strip_areas().iter().sum()
    }
}

/// Aerodynamic model of the device cross-section.
///
/// Serializes as `{"RotatingCylinder": {...}}` or as the bare name of one of the engine's
/// built-in foil models.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionModel {
    /// Rotor sail with tabulated lift over the spin ratio.
    RotatingCylinder(CoefficientTable),
    WingSailSingleElement,
    /// Main element plus flap; the internal state is the flap angle.
    WingSailTwoElement,
    /// The internal state is the suction coefficient.
    SuctionSail,
}

impl SectionModel {
    pub fn name(&self) -> &'static str {
        match self {
            SectionModel::RotatingCylinder(_) => "RotatingCylinder",
            SectionModel::WingSailSingleElement => "WingSailSingleElement",
            SectionModel::WingSailTwoElement => "WingSailTwoElement",
            SectionModel::SuctionSail => "SuctionSail",
        }
    }

    pub fn is_rotating(&self) -> bool {
        matches!(self, SectionModel::RotatingCylinder(_))
    }
}

impl TaggedUnion for SectionModel {
    type Payload = CoefficientTable;

    const NAME: &'static str = "SectionModel";
    const TAGS: &'static [&'static str] = &[
        "RotatingCylinder",
        "WingSailSingleElement",
        "WingSailTwoElement",
        "SuctionSail",
    ];
    const TAG_FIELD: &'static str = "section_model_type";
    const DATA_FIELD: &'static str = "section_model_data";

    fn from_parts(tag: &str, payload: Option<CoefficientTable>) -> Result<Self, String> {
        match (tag, payload) {
            ("RotatingCylinder", Some(table)) => Ok(SectionModel::RotatingCylinder(table)),
            ("RotatingCylinder", None) => {
                Err("section model `RotatingCylinder` requires a coefficient table".to_string())
            }
            (tag, Some(_)) => Err(format!("section model `{tag}` takes no payload")),
            ("WingSailSingleElement", None) => Ok(SectionModel::WingSailSingleElement),
            ("WingSailTwoElement", None) => Ok(SectionModel::WingSailTwoElement),
            ("SuctionSail", None) => Ok(SectionModel::SuctionSail),
            (tag, None) => Err(format!("unknown section model `{tag}`")),
        }
    }

    fn to_parts(&self) -> (&'static str, Option<&CoefficientTable>) {
        match self {
            SectionModel::RotatingCylinder(table) => (self.name(), Some(table)),
            _ => (self.name(), None),
        }
    }
}

impl Serialize for SectionModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_tagged(self, serializer)
    }
}

impl<'de> Deserialize<'de> for SectionModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tagged(deserializer)
    }
}

/// One device: geometry, section model and input power model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WingDefinitionDef", into = "WingDefinitionDef")]
pub struct WingDefinition {
    pub geometry: DeviceGeometry,
    pub section_model: SectionModel,
    pub input_power_model: InputPowerModel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WingDefinitionDef {
    section_points: Vec<SpatialVector>,
    chord_vectors: Vec<SpatialVector>,
    section_model: SectionModel,
    #[serde(default)]
    non_zero_circulation_at_ends: [bool; 2],
    #[serde(default)]
    input_power_model: InputPowerModel,
}

impl TryFrom<WingDefinitionDef> for WingDefinition {
    type Error = ValidationError;

    fn try_from(def: WingDefinitionDef) -> Result<Self, ValidationError> {
        Ok(Self {
            geometry: DeviceGeometry::new(
                def.section_points,
                def.chord_vectors,
                def.non_zero_circulation_at_ends,
            )?,
            section_model: def.section_model,
            input_power_model: def.input_power_model,
        })
    }
}

impl From<WingDefinition> for WingDefinitionDef {
    fn from(w: WingDefinition) -> Self {
        Self {
            section_points: w.geometry.section_points,
            chord_vectors: w.geometry.chord_vectors,
            section_model: w.section_model,
            non_zero_circulation_at_ends: w.geometry.non_zero_circulation_at_ends,
            input_power_model: w.input_power_model,
        }
    }
}

/// Everything the engine needs to set up a scenario.
///
/// Device `i` is `wings[i]`, driven by `controller.set_points[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigurationDocument {
    pub wings: Vec<WingDefinition>,
    pub controller: ControllerBuilder,
    /// Engine solver settings, passed through untouched.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub solver_settings: serde_json::Value,
}

impl ConfigurationDocument {
    pub fn new(wings: Vec<WingDefinition>, controller: ControllerBuilder) -> Self {
        Self {
            wings,
            controller,
            solver_settings: serde_json::Value::Null,
        }
    }

    pub fn with_solver_settings(mut self, solver_settings: serde_json::Value) -> Self {
        self.solver_settings = solver_settings;
        self
    }

    /// Document with one device per simplified sail description, in order.
    pub fn from_sail_setups(setups: &[SimpleSailSetup]) -> ProjectResult<Self> {
        let mut wings = Vec::with_capacity(setups.len());
        let mut set_points = Vec::with_capacity(setups.len());
        for setup in setups {
            wings.push(setup.wing_definition()?);
            set_points.push(setup.controller_set_points()?);
        }
        let document = Self::new(wings, ControllerBuilder::new(set_points));
        validate_document(&document)?;
        Ok(document)
    }

    pub fn nr_wings(&self) -> usize {
        self.wings.len()
    }

    /// Validate and build the controller driving every device.
    pub fn build_controller(&self) -> ProjectResult<Controller> {
        validate_document(self)?;
        Ok(self.controller.build()?)
    }
}
