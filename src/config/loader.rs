//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, LeaveRuleTable, PolicyConfig};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/standard/
/// ├── policy.yaml       # Time windows, payroll and ingestion constants
/// └── leave_rules.yaml  # Ordered leave rule table
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/standard").unwrap();
/// println!("Daily quota: {}h", loader.config().schedule().daily_regular_hours);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if a file is missing, is not valid YAML, or if the
    /// leave rule table breaks one of its invariants.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy = Self::load_yaml::<PolicyConfig>(&path.join("policy.yaml"))?;
        let leave_table = Self::load_yaml::<LeaveRuleTable>(&path.join("leave_rules.yaml"))?;

        let config = EngineConfig::new(policy, leave_table.rules)?;
        tracing::debug!(
            path = %path.display(),
            leave_rules = config.leave_rules().len(),
            "Loaded engine configuration"
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
