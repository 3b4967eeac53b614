use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "village-nird.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON snapshot per store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_scenarios_dir")]
    pub scenarios_dir: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            scenarios_dir: default_scenarios_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// The terminal belongs to the UI, so logs go to a file
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// `EnvFilter` directive, `RUST_LOG` wins when set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

fn default_data_dir() -> PathBuf { PathBuf::from(".village-nird") }
fn default_scenarios_dir() -> PathBuf { PathBuf::from("scenarios") }
fn default_log_file() -> PathBuf { PathBuf::from("village-nird.log") }
fn default_log_filter() -> String { "village_nird=info".to_string() }

impl Config {
    /// Reads `path`, or returns the defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}
