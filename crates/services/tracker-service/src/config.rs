//! Tracker service configuration.

use std::env;
use std::fmt;
use std::path::PathBuf;

use common::StorageConfig;

/// Default directory for the entity files
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default password for generated sample employees
pub const DEFAULT_SEED_PASSWORD: &str = "changeme";

/// Tracker service configuration.
#[derive(Clone)]
pub struct TrackerServiceConfig {
    /// Directory holding the CSV files
    pub data_dir: PathBuf,
    /// Password given to every generated sample employee
    pub seed_password: String,
}

impl TrackerServiceConfig {
    /// Load configuration from environment variables, reading `.env` first.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            data_dir: env::var("TRACKER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            seed_password: env::var("TRACKER_SEED_PASSWORD")
                .ok()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_SEED_PASSWORD.to_string()),
        }
    }

    /// Replace the data directory (command-line override)
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn storage(&self) -> StorageConfig {
        StorageConfig::new(self.data_dir.clone())
    }
}

impl Default for TrackerServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            seed_password: DEFAULT_SEED_PASSWORD.to_string(),
        }
    }
}

impl fmt::Debug for TrackerServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerServiceConfig")
            .field("data_dir", &self.data_dir)
            .field("seed_password", &"[REDACTED]")
            .finish()
    }
}
