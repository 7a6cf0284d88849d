//! Application initialization: load persisted state, or seed it.
//!
//! The decision is returned as a [`BootstrapOutcome`] so callers can report
//! it instead of it happening silently at startup.

use std::fmt;

use tracing::{info, warn};

use common::{AppError, AppResult};

use super::sample_data::generate_sample_data;
use crate::config::TrackerServiceConfig;
use crate::repository::{EntityKind, Storage};
use crate::service::Tracker;

/// How the tracker was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Existing files were read
    Loaded,
    /// No files existed; sample data was generated and written
    Seeded,
}

impl fmt::Display for BootstrapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapOutcome::Loaded => f.write_str("loaded"),
            BootstrapOutcome::Seeded => f.write_str("seeded"),
        }
    }
}

/// Load the tracker; when no table exists yet, seed and save sample data.
///
/// # Errors
/// Some tables present and others missing is `CorruptData`; nothing is
/// written in that case. Any other failure propagates unchanged.
pub fn load_or_seed(
    storage: &dyn Storage,
    config: &TrackerServiceConfig,
) -> AppResult<(Tracker, BootstrapOutcome)> {
    match Tracker::load_from_storage(storage) {
        Ok(tracker) => Ok((tracker, BootstrapOutcome::Loaded)),
        Err(e) if e.is_missing_file() => {
            let missing = missing_tables(storage)?;
            if missing.len() < EntityKind::ALL.len() {
                let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
                warn!(missing = %names.join(", "), "Stored data is incomplete, refusing to seed");
                return Err(AppError::CorruptData(format!(
                    "stored data is incomplete, missing {}",
                    names.join(", ")
                )));
            }
            info!(reason = %e, "No stored data, seeding sample data");
            let tracker = reseed(storage, config)?;
            Ok((tracker, BootstrapOutcome::Seeded))
        }
        Err(e) => Err(e),
    }
}

/// Tables whose backing file does not exist.
fn missing_tables(storage: &dyn Storage) -> AppResult<Vec<EntityKind>> {
    let mut missing = Vec::new();
    for kind in EntityKind::ALL {
        match storage.read(kind) {
            Ok(_) => {}
            Err(e) if e.is_missing_file() => missing.push(kind),
            Err(e) => return Err(e),
        }
    }
    Ok(missing)
}

/// Replace whatever is stored with freshly generated sample data.
pub fn reseed(storage: &dyn Storage, config: &TrackerServiceConfig) -> AppResult<Tracker> {
    let tracker = generate_sample_data(&config.seed_password)?;
    tracker.save_to_storage(storage)?;
    Ok(tracker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockStorage, Rows};
    use common::AppError;
    use domain::{Predicate, WELL_KNOWN_PERMISSIONS};
    use mockall::predicate::eq;

    use crate::service::AuthService;

    #[test]
    fn test_existing_data_is_loaded() {
        let mut storage = MockStorage::new();
        storage
            .expect_read()
            .times(4)
            .returning(|kind| Ok(Rows::empty(kind)));
        storage.expect_write().never();

        let (tracker, outcome) = load_or_seed(&storage, &TrackerServiceConfig::default()).unwrap();
        assert_eq!(outcome, BootstrapOutcome::Loaded);
        assert_eq!(tracker.employee_count(), 0);
    }

    #[test]
    fn test_missing_file_seeds_and_saves() {
        let mut storage = MockStorage::new();
        // One failed load, then one check per table
        storage
            .expect_read()
            .with(eq(EntityKind::Permissions))
            .times(2)
            .returning(|kind| Err(AppError::FileNotFound(kind.file_name().into())));
        storage
            .expect_read()
            .withf(|kind| *kind != EntityKind::Permissions)
            .times(3)
            .returning(|kind| Err(AppError::FileNotFound(kind.file_name().into())));
        storage
            .expect_write()
            .withf(|rows| rows.kind() == EntityKind::Employees && rows.len() == 25)
            .times(1)
            .returning(|_| Ok(()));
        storage
            .expect_write()
            .withf(|rows| rows.kind() != EntityKind::Employees)
            .times(3)
            .returning(|_| Ok(()));

        let config = TrackerServiceConfig {
            seed_password: "letmein".to_string(),
            ..Default::default()
        };
        let (tracker, outcome) = load_or_seed(&storage, &config).unwrap();

        assert_eq!(outcome, BootstrapOutcome::Seeded);
        assert_eq!(tracker.employee_count(), 25);
        assert_eq!(tracker.department_count(), 5);
        assert_eq!(tracker.permission_count(), WELL_KNOWN_PERMISSIONS.len());

        let alice = tracker
            .list_employees(&[Predicate::parse("string", "name", "Alice").unwrap()])
            .unwrap()[0]
            .id()
            .to_string();
        assert!(tracker.login(&alice, "letmein").unwrap().is_superuser());
    }

    #[test]
    fn test_partial_data_is_not_overwritten() {
        let mut storage = MockStorage::new();
        storage
            .expect_read()
            .returning(|kind| match kind {
                EntityKind::Departments => Err(AppError::FileNotFound(kind.file_name().into())),
                other => Ok(Rows::empty(other)),
            });
        storage.expect_write().never();

        let err = load_or_seed(&storage, &TrackerServiceConfig::default()).unwrap_err();
        match err {
            AppError::CorruptData(msg) => assert!(msg.contains("departments")),
            other => panic!("expected CorruptData, got {:?}", other),
        }
    }

    #[test]
    fn test_other_errors_propagate() {
        let mut storage = MockStorage::new();
        storage
            .expect_read()
            .returning(|_| Err(AppError::CorruptData("bad row".to_string())));
        storage.expect_write().never();

        let err = load_or_seed(&storage, &TrackerServiceConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::CorruptData(_)));
    }

    #[test]
    fn test_sample_departments_reference_employees() {
        let tracker = generate_sample_data("changeme").unwrap();
        let engineering = tracker
            .list_departments(&[Predicate::parse("string", "name", "Engineering").unwrap()])
            .unwrap()[0];
        assert_eq!(engineering.members().len(), 8);
        let head = tracker.get_employee(&engineering.head_of_department).unwrap();
        assert_eq!(head.name, "Umar Khan");
        assert!(tracker.department_cycles().is_empty());
    }
}
