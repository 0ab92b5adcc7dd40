use sf_core::SpatialVector;
use sf_project::{
    ConfigurationDocument, SailType, SimpleSailSetup, from_json_str, from_yaml_str, load_json,
    load_yaml, rotor_positions, save_json, save_yaml, to_json_string, to_yaml_string,
};

fn mixed_fleet() -> ConfigurationDocument {
    let mut setups: Vec<SimpleSailSetup> = rotor_positions(2, 5.0, 2.0)
        .into_iter()
        .map(|p| SimpleSailSetup::new(p, 5.0, 35.0, SailType::RotorSail))
        .collect();
    setups.push(SimpleSailSetup::new(
        SpatialVector::new(-40.0, 0.0, 10.0),
        8.0,
        30.0,
        SailType::WingSailTwoElement,
    ));
    setups.push(SimpleSailSetup::new(
        SpatialVector::new(40.0, 0.0, 10.0),
        4.0,
        20.0,
        SailType::SuctionSail,
    ));
    ConfigurationDocument::from_sail_setups(&setups)
        .unwrap()
        .with_solver_settings(serde_json::json!({"nr_iterations": 30, "damping": 0.1}))
}

#[test]
fn roundtrip_json_file() {
    let document = mixed_fleet();
    let path = std::env::temp_dir().join("sf_project_roundtrip.json");

    save_json(&path, &document).unwrap();
    let loaded = load_json(&path).unwrap();

    assert_eq!(document, loaded);
}

#[test]
fn roundtrip_yaml_file() {
    let document = mixed_fleet();
    let path = std::env::temp_dir().join("sf_project_roundtrip.yaml");

    save_yaml(&path, &document).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(document, loaded);
}

#[test]
fn roundtrip_strings() {
    let document = mixed_fleet();
    assert_eq!(from_json_str(&to_json_string(&document).unwrap()).unwrap(), document);
    assert_eq!(from_yaml_str(&to_yaml_string(&document).unwrap()).unwrap(), document);
}

#[test]
fn invalid_documents_are_not_saved() {
    let mut document = mixed_fleet();
    document.controller.set_points.pop();
    let path = std::env::temp_dir().join("sf_project_invalid.json");
    assert!(save_json(&path, &document).is_err());
    assert!(to_yaml_string(&document).is_err());
}

#[test]
fn missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("sf_project_does_not_exist.yaml");
    let err = load_yaml(&path).unwrap_err();
    assert!(matches!(err, sf_project::ProjectError::Io(_)), "{err}");
}
