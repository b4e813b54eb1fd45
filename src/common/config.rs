//! Configuration for a minivol node

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Node ID (unique identifier)
    pub node_id: String,

    /// Root paths of the local drives, in registry order
    pub drives: Vec<PathBuf>,

    /// Maximum in-flight drive calls per operation
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_in_flight() -> usize {
    32
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .map_err(|e| crate::Error::InvalidConfig(e.to_string()))?;

        let cfg: Config = cfg
            .try_deserialize()
            .map_err(|e| crate::Error::InvalidConfig(e.to_string()))?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.node_id.is_empty() {
            return Err(crate::Error::InvalidConfig("node_id cannot be empty".into()));
        }
        if self.drives.is_empty() {
            return Err(crate::Error::InvalidConfig(
                "at least one drive root is required".into(),
            ));
        }
        if self.max_in_flight == 0 {
            return Err(crate::Error::InvalidConfig(
                "max_in_flight must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
