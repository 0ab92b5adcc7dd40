//! Configuration document validation.

use sf_controls::{ControlError, InternalStateTag};

use crate::schema::ConfigurationDocument;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid geometry: {what}")]
    Geometry { what: &'static str },

    #[error("Empty {what}")]
    Empty { what: &'static str },

    #[error("Count mismatch in {what}: expected {expected}, found {found}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid controller: {0}")]
    Controller(#[from] ControlError),
}

pub fn validate_document(document: &ConfigurationDocument) -> Result<(), ValidationError> {
    if document.wings.is_empty() {
        return Err(ValidationError::Empty { what: "wings" });
    }

    let set_points = &document.controller.set_points;
    if set_points.len() != document.wings.len() {
        return Err(ValidationError::CountMismatch {
            what: "controller set points",
            expected: document.wings.len(),
            found: set_points.len(),
        });
    }

    // Schedule and filter settings.
    document.controller.build()?;

    for (i, (wing, table)) in document.wings.iter().zip(set_points).enumerate() {
        let spin_ratio = table.internal_state_kind().tag() == InternalStateTag::SpinRatio;
        if spin_ratio && !wing.section_model.is_rotating() {
            return Err(ValidationError::InvalidValue {
                field: format!("controller.set_points[{i}].internal_state_type"),
                value: "SpinRatio".to_string(),
                reason: format!(
                    "spin ratio control needs a rotating section model, wing {i} uses `{}`",
                    wing.section_model.name()
                ),
            });
        }
    }

    if !(document.solver_settings.is_null() || document.solver_settings.is_object()) {
        return Err(ValidationError::InvalidValue {
            field: "solver_settings".to_string(),
            value: document.solver_settings.to_string(),
            reason: "must be an object".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DeviceGeometry, SectionModel, WingDefinition};
    use sf_controls::{ControlSetPointTable, ControllerBuilder, SpinRatioConversion};
    use sf_core::SpatialVector;
    use sf_power::InputPowerModel;

    fn wing(section_model: SectionModel) -> WingDefinition {
        WingDefinition {
            geometry: DeviceGeometry::straight(SpatialVector::ZERO, 5.0, 35.0).unwrap(),
            section_model,
            input_power_model: InputPowerModel::NoPower,
        }
    }

    fn document(set_points: Vec<ControlSetPointTable>) -> ConfigurationDocument {
        ConfigurationDocument::new(
            vec![wing(SectionModel::WingSailSingleElement)],
            ControllerBuilder::new(set_points),
        )
    }

    #[test]
    fn valid_document_passes() {
        let doc = document(vec![ControlSetPointTable::default_wing_sail_single_element()]);
        assert_eq!(validate_document(&doc), Ok(()));
    }

    #[test]
    fn empty_document_rejected() {
        let doc = ConfigurationDocument::new(vec![], ControllerBuilder::new(vec![]));
        assert_eq!(
            validate_document(&doc),
            Err(ValidationError::Empty { what: "wings" })
        );
    }

    #[test]
    fn one_table_per_wing() {
        let table = ControlSetPointTable::default_wing_sail_single_element();
        let doc = document(vec![table.clone(), table]);
        assert!(matches!(
            validate_document(&doc),
            Err(ValidationError::CountMismatch {
                expected: 1,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn controller_settings_checked() {
        let mut doc = document(vec![ControlSetPointTable::default_wing_sail_single_element()]);
        doc.controller.time_steps_between_updates = 0;
        assert!(matches!(
            validate_document(&doc),
            Err(ValidationError::Controller(_))
        ));
    }

    #[test]
    fn spin_ratio_needs_rotor() {
        let conv = SpinRatioConversion::new(5.0, 3.0).unwrap();
        let doc = document(vec![ControlSetPointTable::default_rotor_sail(conv)]);
        let err = validate_document(&doc).unwrap_err();
        assert!(err.to_string().contains("WingSailSingleElement"), "{err}");
    }

    #[test]
    fn solver_settings_must_be_an_object() {
        let doc = document(vec![ControlSetPointTable::default_wing_sail_single_element()])
            .with_solver_settings(serde_json::json!([1, 2]));
        assert!(validate_document(&doc).is_err());
        let doc = doc.with_solver_settings(serde_json::json!({"nr_iterations": 20}));
        assert!(validate_document(&doc).is_ok());
    }
}
