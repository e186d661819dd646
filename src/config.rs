//! Configuration for the flashcards scheduler.
//!
//! Loaded from YAML. Search order:
//! 1. Explicit path if provided
//! 2. .flashcards.yml in the current directory
//! 3. ~/.config/flashcards/flashcards.yml
//! 4. Defaults

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_FILE: &str = ".flashcards.yml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding the review log.
    #[serde(rename = "database-path")]
    pub database_path: PathBuf,

    /// Log level used when RUST_LOG is not set.
    #[serde(rename = "log-level")]
    pub log_level: String,

    /// Reviewed cards become due this many seconds after their due date.
    #[serde(rename = "due-grace-seconds")]
    pub due_grace_seconds: u32,

    /// How long a write waits on a locked database, in milliseconds.
    #[serde(rename = "busy-timeout-ms")]
    pub busy_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: data_dir().join("flashcards.sqlite3"),
            log_level: "info".to_string(),
            due_grace_seconds: 60,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Local data directory for the database and logs.
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flashcards")
}

impl Config {
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path takes precedence
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(PROJECT_CONFIG_FILE);
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from {}", PROJECT_CONFIG_FILE);
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load {}: {}", PROJECT_CONFIG_FILE, e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("flashcards").join("flashcards.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            eyre::bail!("database-path must not be empty");
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            eyre::bail!("log-level '{}' is not a valid level", self.log_level);
        }
        Ok(())
    }

    pub fn due_grace(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.due_grace_seconds))
    }

    pub fn busy_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.busy_timeout_ms)
    }
}
