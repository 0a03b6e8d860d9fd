//! Configuration for zone partitioning runs.
//!
//! [`FlexZoneConfig`] is read from TOML. Every section and field is
//! optional; unspecified values use the defaults below.
//!
//! ```toml
//! [zoning]
//! n_zones = 5
//! min_nodes = 5
//!
//! [runner]
//! parallel = true
//! worker_threads = 0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ZoningError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlexZoneConfig {
    /// Heuristic parameters.
    pub zoning: ZoningParams,

    /// How periods are scheduled.
    pub runner: RunnerConfig,
}

/// Parameters of the partitioning heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoningParams {
    /// Maximum number of zones per period.
    pub n_zones: usize,

    /// Minimum number of nodes in every zone created by a split.
    pub min_nodes: usize,
}

impl Default for ZoningParams {
    fn default() -> Self {
        Self {
            n_zones: 5,
            min_nodes: 5,
        }
    }
}

impl ZoningParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_zones == 0 {
            return Err(ZoningError::InvalidConfig(
                "n_zones must be at least 1".to_string(),
            ));
        }
        if self.min_nodes == 0 {
            return Err(ZoningError::InvalidConfig(
                "min_nodes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scheduling of independent periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Partition periods on a thread pool (needs the `parallel` feature).
    pub parallel: bool,

    /// Worker threads; 0 lets rayon decide.
    pub worker_threads: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            worker_threads: 0,
        }
    }
}

impl FlexZoneConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.zoning.validate()
    }
}
