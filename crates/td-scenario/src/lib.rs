//! td-scenario: scenario data model, configuration and validation.

pub mod config;
pub mod schema;
pub mod validate;

pub use config::*;
pub use schema::*;
pub use validate::{
    ValidationError, check_switch_exclusivity, find_switch_conflict, validate_narratives,
    validate_scenario,
};

pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(thiserror::Error, Debug)]
pub enum ScenarioError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_config_yaml(path: &std::path::Path) -> ScenarioResult<ScenarioConfig> {
    let content = std::fs::read_to_string(path)?;
    config_from_yaml_str(&content)
}

pub fn config_from_yaml_str(content: &str) -> ScenarioResult<ScenarioConfig> {
    let config: ScenarioConfig = serde_yaml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config_json(path: &std::path::Path) -> ScenarioResult<ScenarioConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ScenarioConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config_yaml(path: &std::path::Path, config: &ScenarioConfig) -> ScenarioResult<()> {
    config.validate()?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
