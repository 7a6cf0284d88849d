//! Tracker Service Library
//!
//! This crate provides the employee tracker: the aggregate root, login,
//! CSV persistence and first-run seeding. The command-line front end in
//! the combined binary drives it.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use tracing::info;

use common::AppResult;

use crate::config::TrackerServiceConfig;
use crate::infra::BootstrapOutcome;
use crate::repository::CsvStorage;
use crate::service::Tracker;

pub use crate::infra::{generate_sample_data, load_or_seed, reseed};
pub use crate::repository::{EntityKind, Rows, Storage};
pub use crate::service::AuthService;

/// Initialization action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitAction {
    /// Load stored data, seeding only when none exists
    LoadOrSeed,
    /// Discard stored data and seed again
    Reseed,
}

/// Storage adapter for the configured data directory.
pub fn open_storage(config: &TrackerServiceConfig) -> CsvStorage {
    CsvStorage::new(config.storage())
}

/// Open the tracker with the given configuration.
pub fn initialize(
    config: &TrackerServiceConfig,
    action: InitAction,
) -> AppResult<(Tracker, BootstrapOutcome)> {
    let storage = open_storage(config);
    let result = match action {
        InitAction::LoadOrSeed => load_or_seed(&storage, config)?,
        InitAction::Reseed => (reseed(&storage, config)?, BootstrapOutcome::Seeded),
    };
    info!(data_dir = %config.data_dir.display(), outcome = %result.1, "Tracker ready");
    Ok(result)
}
