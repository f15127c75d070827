//! Configuration schema for Scrapyard
//!
//! Configuration is stored at `~/.config/scrapyard/config.toml`

use crate::key::DEFAULT_EXTENSION;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Yard defaults
    pub yard: YardConfig,

    /// S3 backend settings
    pub s3: S3Config,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

impl GeneralConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// Yard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YardConfig {
    /// Yard used when no `--yard` is given
    pub path: String,

    /// Extension of stored tarballs
    pub extension: String,
}

impl Default for YardConfig {
    fn default() -> Self {
        Self {
            path: "/tmp/scrapyard".to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// S3 backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    /// AWS CLI executable
    pub command: String,

    /// Where fetched and packed tarballs are staged (temp dir if unset)
    pub staging_dir: Option<PathBuf>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            command: "aws".to_string(),
            staging_dir: None,
        }
    }
}
