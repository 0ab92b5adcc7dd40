//! sf-project: the configuration document handed to the lifting-line engine, and its validation.

pub mod sail;
pub mod schema;
pub mod validate;

use std::path::Path;

use sf_aero::AeroError;
use sf_controls::ControlError;
use sf_power::PowerError;
use tracing::debug;

pub use sail::{SailType, SimpleSailSetup, rotor_positions};
pub use schema::*;
pub use validate::{ValidationError, validate_document};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Control law error: {0}")]
    Control(#[from] ControlError),

    #[error("Input power error: {0}")]
    Power(#[from] PowerError),

    #[error("Section model error: {0}")]
    Aero(#[from] AeroError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_json_str(content: &str) -> ProjectResult<ConfigurationDocument> {
    let document: ConfigurationDocument = serde_json::from_str(content)?;
    validate_document(&document)?;
    Ok(document)
}

/// Compact JSON, the form the engine consumes.
pub fn to_json_string(document: &ConfigurationDocument) -> ProjectResult<String> {
    validate_document(document)?;
    Ok(serde_json::to_string(document)?)
}

pub fn from_yaml_str(content: &str) -> ProjectResult<ConfigurationDocument> {
    let document: ConfigurationDocument = serde_yaml::from_str(content)?;
    validate_document(&document)?;
    Ok(document)
}

pub fn to_yaml_string(document: &ConfigurationDocument) -> ProjectResult<String> {
    validate_document(document)?;
    Ok(serde_yaml::to_string(document)?)
}

pub fn load_yaml(path: &Path) -> ProjectResult<ConfigurationDocument> {
    debug!(path = %path.display(), "loading YAML configuration");
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &Path, document: &ConfigurationDocument) -> ProjectResult<()> {
    let content = to_yaml_string(document)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<ConfigurationDocument> {
    debug!(path = %path.display(), "loading JSON configuration");
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

pub fn save_json(path: &Path, document: &ConfigurationDocument) -> ProjectResult<()> {
    validate_document(document)?;
    let content = serde_json::to_string_pretty(document)?;
    std::fs::write(path, content)?;
    Ok(())
}
