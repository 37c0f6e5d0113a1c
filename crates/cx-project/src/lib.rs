//! cx-project: simulation configuration schema, validation and file I/O.

pub mod pressure;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use pressure::{PressureMode, PressureResolution};
pub use schema::*;
pub use validate::{ValidationError, ValidationIssue, validate_inputs};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported config format: {path}")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<SimulationInputs> {
    let content = std::fs::read_to_string(path)?;
    let inputs: SimulationInputs = serde_yaml::from_str(&content)?;
    validate_inputs(&inputs)?;
    Ok(inputs)
}

pub fn save_yaml(path: &Path, inputs: &SimulationInputs) -> ProjectResult<()> {
    validate_inputs(inputs)?;
    let content = serde_yaml::to_string(inputs)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<SimulationInputs> {
    let content = std::fs::read_to_string(path)?;
    let inputs: SimulationInputs = serde_json::from_str(&content)?;
    validate_inputs(&inputs)?;
    Ok(inputs)
}

pub fn save_json(path: &Path, inputs: &SimulationInputs) -> ProjectResult<()> {
    validate_inputs(inputs)?;
    let content = serde_json::to_string_pretty(inputs)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a config file, picking YAML or JSON from the extension.
pub fn load_config(path: &Path) -> ProjectResult<SimulationInputs> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("yaml") | Some("yml") => load_yaml(path),
        Some("json") => load_json(path),
        _ => Err(ProjectError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}
