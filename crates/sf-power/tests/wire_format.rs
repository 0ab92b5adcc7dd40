//! Input power models as they appear inside larger documents.

use serde::{Deserialize, Serialize};
use sf_power::{InputPowerData, InputPowerModel, InputPowerTag};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Wing {
    #[serde(default)]
    input_power_model: InputPowerModel,
}

#[test]
fn missing_model_defaults_to_no_power() {
    let wing: Wing = serde_json::from_str("{}").unwrap();
    assert_eq!(wing.input_power_model, InputPowerModel::NoPower);
    assert_eq!(
        serde_json::to_string(&wing).unwrap(),
        r#"{"input_power_model":"NoPower"}"#
    );
}

#[test]
fn yaml_authoring_forms() {
    let single_key = "
input_power_model:
  InterpolateFromInternalStateOnly:
    section_models_internal_state_data: [0.0, 1.0]
    input_power_coefficient_data: [0.0, 0.5]
";
    let normalized = "
input_power_model:
  input_power_type: InterpolateFromInternalStateOnly
  input_power_data:
    section_models_internal_state_data: [0.0, 1.0]
    input_power_coefficient_data: [0.0, 0.5]
";
    let a: Wing = serde_yaml::from_str(single_key).unwrap();
    let b: Wing = serde_yaml::from_str(normalized).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        a.input_power_model.tag(),
        InputPowerTag::InterpolateFromInternalStateOnly
    );

    let bare: Wing = serde_yaml::from_str("input_power_model: InternalStateAsPowerCoefficient").unwrap();
    assert_eq!(
        bare.input_power_model,
        InputPowerModel::InternalStateAsPowerCoefficient
    );
}

#[test]
fn rotor_curve_survives_the_wire() {
    let model = InputPowerModel::polynomial_rotor_sail_model(175_000.0, 3.0, 175.0).unwrap();
    let json = serde_json::to_string(&model).unwrap();
    assert!(json.starts_with(r#"{"InterpolateFromInternalStateOnly":{"section_models_internal_state_data":[0.0,"#));
    let back: InputPowerModel = serde_json::from_str(&json).unwrap();
    assert_eq!(back, model);
}

#[test]
fn tables_are_validated_on_the_way_in() {
    let json = r#"{"input_power_model": {"InterpolatePowerCoefficientFromInternalState":
        {"section_models_internal_state_data": [], "input_power_coefficient_data": []}}}"#;
    let err = serde_json::from_str::<Wing>(json).unwrap_err();
    assert!(err.to_string().contains("at least one entry"), "{err}");
    assert!(InputPowerData::new(vec![0.0, 2.0], vec![1.0, 1.0]).is_ok());
}
