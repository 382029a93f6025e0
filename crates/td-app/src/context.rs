//! Immutable input of a scenario run.

use std::path::Path;

use td_scenario::{ScenarioConfig, ScenarioDef, validate_scenario};

use crate::error::{AppError, AppResult};

/// Validated scenario definition and configuration.
///
/// Every stage borrows from the context; nothing mutates it after
/// construction.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    def: ScenarioDef,
    config: ScenarioConfig,
}

impl ScenarioContext {
    pub fn new(def: ScenarioDef, config: ScenarioConfig) -> AppResult<Self> {
        validate_scenario(&def, &config)?;
        Ok(Self { def, config })
    }

    /// Parse a scenario definition and a configuration from YAML text.
    pub fn from_yaml_str(def_yaml: &str, config_yaml: &str) -> AppResult<Self> {
        let def: ScenarioDef =
            serde_yaml::from_str(def_yaml).map_err(td_scenario::ScenarioError::from)?;
        let config = td_scenario::config_from_yaml_str(config_yaml)?;
        Self::new(def, config)
    }

    pub fn load_yaml(def_path: &Path, config_path: &Path) -> AppResult<Self> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|source| AppError::FileRead {
                path: path.to_path_buf(),
                source,
            })
        };
        Self::from_yaml_str(&read(def_path)?, &read(config_path)?)
    }

    pub fn def(&self) -> &ScenarioDef {
        &self.def
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }
}
