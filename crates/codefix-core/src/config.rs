//! Configuration management for codefix
//!
//! Settings for the history database, the code runner, the HTTP server and
//! any extra error explanations. Loaded from `.codefix/config.toml` in the
//! working directory, with environment overrides applied on top.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::classifier::ErrorTable;
use crate::{CodefixError, Result};

/// Overrides `storage.path`
pub const DATABASE_PATH_ENV: &str = "CODEFIX_DATABASE_PATH";
/// Overrides `runner.interpreter`
pub const INTERPRETER_ENV: &str = "CODEFIX_INTERPRETER";

/// Workspace-level codefix configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodefixConfig {
    /// History database settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Code execution settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// HTTP API settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Extra category → explanation entries layered over the builtin table
    #[serde(default)]
    pub explanations: BTreeMap<String, String>,
}

/// History database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the SQLite history database
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

/// Code runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Interpreter executable used to run submitted code
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Wall-clock limit for one execution
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the API to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Records returned by `GET /history` when no limit is given
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

// Default value providers
fn default_database_path() -> PathBuf {
    PathBuf::from(".codefix/history.db")
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_history_limit() -> usize {
    10
}

impl CodefixConfig {
    /// Path of the config file under `root`
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(".codefix/config.toml")
    }

    /// Load configuration from `.codefix/config.toml` or use defaults.
    ///
    /// Environment overrides are applied after the file is read.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let config_path = Self::path_in(root);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CodefixError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Write default configuration to `.codefix/config.toml`
    pub fn write_default(root: &Path) -> Result<PathBuf> {
        let config_path = Self::path_in(root);
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| CodefixError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DATABASE_PATH_ENV).filter(|v| !v.is_empty()) {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(interpreter) = lookup(INTERPRETER_ENV).filter(|v| !v.is_empty()) {
            self.runner.interpreter = interpreter;
        }
    }

    /// Resolve the database path against `root` when it is relative
    pub fn database_path(&self, root: &Path) -> PathBuf {
        if self.storage.path.is_absolute() {
            self.storage.path.clone()
        } else {
            root.join(&self.storage.path)
        }
    }

    /// Build the frozen error table from builtins plus configured entries
    pub fn error_table(&self) -> ErrorTable {
        ErrorTable::with_extra(self.explanations.clone())
    }
}

impl Default for CodefixConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            runner: RunnerConfig::default(),
            server: ServerConfig::default(),
            explanations: BTreeMap::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            history_limit: default_history_limit(),
        }
    }
}
