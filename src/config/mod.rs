//! Configuration module for the pipeline runner
//!
//! The runner reads a small TOML file with two tables:
//!
//! ```toml
//! [logging]
//! level = "info"
//! directory = "/var/log/matpipe"   # optional, enables the rolling file log
//! file_prefix = "pipeline-runner"
//!
//! [execution]
//! halt_on_preflight_error = true
//! preflight_only = false
//! dump_schema = "schema.json"      # optional
//! ```
//!
//! # Config Location
//!
//! Without an explicit path the file is looked up in the platform config
//! directory:
//! - **Linux**: `~/.config/matpipe/runner.toml`
//! - **macOS**: `~/Library/Application Support/matpipe/runner.toml`
//! - **Windows**: `%APPDATA%\matpipe\runner.toml`
//!
//! A missing file is not an error; every field has a default.

use crate::error::{MatpipeError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "matpipe";

/// Runner config filename
pub const RUNNER_CONFIG_FILE: &str = "runner.toml";

/// Get the platform config directory for matpipe
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path of the default runner config file
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(RUNNER_CONFIG_FILE))
}

// ==================== Logging ====================

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for daily rolling log files, none disables file logging
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// File name prefix for rolled log files
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "pipeline-runner".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

// ==================== Execution ====================

/// How the runner drives a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Skip the execute pass when preflight reports a negative code
    #[serde(default = "default_true")]
    pub halt_on_preflight_error: bool,

    /// Stop after preflight
    #[serde(default)]
    pub preflight_only: bool,

    /// Write the resulting Store schema as JSON to this path
    #[serde(default)]
    pub dump_schema: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            halt_on_preflight_error: true,
            preflight_only: false,
            dump_schema: None,
        }
    }
}

// ==================== Runner Config ====================

/// Complete runner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,
}

impl RunnerConfig {
    /// Load a config from `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            MatpipeError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load from an explicit path, else the default location, else defaults.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match default_config_path() {
            Some(default) if default.exists() => Self::load(default),
            _ => Ok(Self::default()),
        }
    }

    /// Save as pretty TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MatpipeError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}
