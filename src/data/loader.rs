//! Load simulation and matrix configs from JSON or YAML, chosen by file extension.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::data::config::{MatrixConfig, SimulationConfig};
use crate::data::validate::{validate_simulation_config, ValidationReport};
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(SimError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub fn parse_config_str<T: DeserializeOwned>(raw: &str, format: ConfigFormat) -> Result<T> {
    match format {
        ConfigFormat::Json => Ok(serde_json::from_str(raw)?),
        ConfigFormat::Yaml => Ok(serde_yaml::from_str(raw)?),
    }
}

fn load_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let raw = fs::read_to_string(path)?;
    parse_config_str(&raw, format)
}

pub fn load_simulation_config(path: impl AsRef<Path>) -> Result<SimulationConfig> {
    load_file(path)
}

pub fn load_matrix_config(path: impl AsRef<Path>) -> Result<MatrixConfig> {
    load_file(path)
}

/// Load a battle config and refuse it when validation reports errors.
/// Returns the config plus the (warning-only) report.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<(SimulationConfig, ValidationReport)> {
    let path = path.as_ref();
    let config = load_simulation_config(path)?;
    let report = validate_simulation_config(&config);
    for diag in &report.diagnostics {
        tracing::warn!(context = %diag.context, severity = %diag.severity, "{}", diag.message);
    }
    if report.has_errors() {
        return Err(SimError::InvalidConfiguration(format!(
            "'{}' failed validation: {}",
            path.display(),
            report.error_summary()
        )));
    }
    Ok((config, report))
}
