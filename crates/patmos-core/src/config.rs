//! Configuration management for patmos
//!
//! Resolves where the coefficient store lives and which view to read.
//! Values come from, in order: explicit overrides, the `DB_DIR` and
//! `VTT_DATA` environment variables, then an optional `patmos.toml`.
//!
//! ```toml
//! [store]
//! db_dir = "/data/vtt"
//!
//! [output]
//! view = "patmos.2013"
//!
//! [general]
//! log_level = "warn"
//! log_format = "pretty"
//! log_file = "/var/log/patmos.log"
//! ```

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coeffs::View;
use crate::error::{ConfigError, Error, Result, StorageError};

/// Environment variables naming the store directory, in priority order.
/// `VTT_DATA` is what the historical 2013 dump read.
pub const DB_DIR_VARS: [&str; 2] = ["DB_DIR", "VTT_DATA"];

/// Fixed file name of the coefficient store inside the data directory
pub const STORE_FILE_NAME: &str = "avhrr.sqlite";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown log format: {s}. Expected pretty or json")),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Also append logs to this file
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Store location
///
/// Only the directory is configurable; the file inside it is always
/// [`STORE_FILE_NAME`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory holding the store; the environment wins over this value
    #[serde(default)]
    pub db_dir: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// View used by `dump` when none is given
    #[serde(default = "default_view")]
    pub view: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            view: default_view(),
        }
    }
}

fn default_view() -> String {
    View::PATMOS_2013.to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&text).map_err(|message| {
            Error::from(ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            })
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> std::result::Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Default view for whole-view dumps
    #[must_use]
    pub fn default_view(&self) -> View {
        View::new(self.output.view.clone())
    }

    /// Resolve the store directory with an injectable environment lookup.
    ///
    /// Empty variables count as unset.
    pub fn resolve_db_dir_with<F>(&self, override_dir: Option<&Path>, lookup: F) -> Result<PathBuf>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        for var in DB_DIR_VARS {
            if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
                tracing::debug!(var, "store directory taken from environment");
                return Ok(PathBuf::from(value));
            }
        }
        if let Some(dir) = &self.store.db_dir {
            return Ok(dir.clone());
        }
        Err(ConfigError::Missing {
            vars: DB_DIR_VARS.iter().map(|v| (*v).to_string()).collect(),
        }
        .into())
    }

    /// Resolve and check the full store path.
    ///
    /// Fails with `ConfigError::Missing` before touching the filesystem, and
    /// with `StorageError::StoreNotFound` when the file is absent.
    pub fn resolve_store_path_with<F>(
        &self,
        override_dir: Option<&Path>,
        lookup: F,
    ) -> Result<PathBuf>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let dir = self.resolve_db_dir_with(override_dir, lookup)?;
        let path = dir.join(STORE_FILE_NAME);
        if !path.is_file() {
            return Err(StorageError::StoreNotFound(path).into());
        }
        Ok(path)
    }

    /// [`Self::resolve_store_path_with`] against the process environment.
    pub fn resolve_store_path(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        self.resolve_store_path_with(override_dir, |key| std::env::var_os(key))
    }
}
