//! Process configuration, loaded from a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Upper bound for `scan_limit`; bounded scans must stay finite.
pub const MAX_SCAN_LIMIT: usize = 10_000;

/// Default cap on rows walked by the data dictionary and recommendation scans.
pub const DEFAULT_SCAN_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Allowed vocabularies used to validate extracted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    #[serde(default = "default_data_levels")]
    pub data_levels: Vec<String>,
    #[serde(default = "default_risk_levels")]
    pub risk_levels: Vec<String>,
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            data_levels: default_data_levels(),
            risk_levels: default_risk_levels(),
        }
    }
}

fn default_data_levels() -> Vec<String> {
    ["PUBLIC", "INTERNAL", "RESTRICTED", "SECRET", "UNKNOWN"]
        .map(String::from)
        .to_vec()
}

fn default_risk_levels() -> Vec<String> {
    ["MAXIMUM", "HIGH", "MEDIUM", "LOW", "UNKNOWN"]
        .map(String::from)
        .to_vec()
}

fn default_scan_limit() -> usize {
    DEFAULT_SCAN_LIMIT
}

/// Where documents are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Directory of JSON grid exports.
    Json { path: PathBuf },
    /// Directory of `.xlsx`/`.ods` workbooks.
    Workbooks { path: PathBuf },
}

/// Where parsed records are delivered. One sink per deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    /// Service registry (`POST {url}/api/v1/rra/update`).
    ServiceMap {
        url: String,
        #[serde(default)]
        token: Option<String>,
    },
    /// Event bus endpoint accepting JSON events.
    EventBus { url: String },
    /// Write one JSON file per record.
    Directory { path: PathBuf },
}

/// Defect tracker used to chase RRAs with missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugzillaConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub product: String,
    pub component: String,
    /// Assignees rotated through when filing follow-up bugs.
    #[serde(default)]
    pub assignees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub levels: Levels,
    #[serde(default = "default_scan_limit")]
    pub scan_limit: usize,
    #[serde(default)]
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub sink: Option<SinkConfig>,
    #[serde(default)]
    pub bugzilla: Option<BugzillaConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            levels: Levels::default(),
            scan_limit: DEFAULT_SCAN_LIMIT,
            source: None,
            sink: None,
            bugzilla: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.data_levels.is_empty() {
            return Err(ConfigError::Invalid("data_levels is empty".into()));
        }
        if self.levels.risk_levels.is_empty() {
            return Err(ConfigError::Invalid("risk_levels is empty".into()));
        }
        if self.scan_limit == 0 || self.scan_limit > MAX_SCAN_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "scan_limit must be between 1 and {MAX_SCAN_LIMIT}, got {}",
                self.scan_limit
            )));
        }
        Ok(())
    }
}
