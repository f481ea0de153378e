//! Workflow configuration loaded from YAML.
//!
//! No timeout is defined by the external services themselves, so each call
//! is bounded here and expiry is treated as a call failure.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Bounds for per-stage suggestion fetches.
    #[serde(default)]
    pub suggestion: ServiceConfig,
    /// Bounds for single-idea evaluation calls.
    #[serde(default)]
    pub evaluation: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

impl WorkflowConfig {
    /// Loads and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// carries a zero timeout.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.suggestion.timeout_secs == 0 {
            bail!("suggestion.timeout_secs must be greater than zero");
        }
        if self.evaluation.timeout_secs == 0 {
            bail!("evaluation.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn suggestion_timeout(&self) -> Duration {
        Duration::from_secs(self.suggestion.timeout_secs)
    }

    pub fn evaluation_timeout(&self) -> Duration {
        Duration::from_secs(self.evaluation.timeout_secs)
    }
}
