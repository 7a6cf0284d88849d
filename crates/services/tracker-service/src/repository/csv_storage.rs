//! CSV implementation of the storage adapter.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::storage::{EntityKind, Rows, Storage};
use common::{AppError, AppResult, StorageConfig};

/// One CSV file per entity kind inside the configured data directory.
///
/// Writes go to a sibling temporary file first, then replace the target.
pub struct CsvStorage {
    config: StorageConfig,
}

impl CsvStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn path_for(&self, kind: EntityKind) -> PathBuf {
        self.config.path_for(kind.file_name())
    }

    fn read_rows<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
        if !path.is_file() {
            return Err(AppError::FileNotFound(path.to_path_buf()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        reader
            .deserialize()
            .enumerate()
            .map(|(idx, row)| {
                row.map_err(|e| {
                    AppError::CorruptData(format!("{} row {}: {}", path.display(), idx + 1, e))
                })
            })
            .collect()
    }

    fn write_rows<T: Serialize>(&self, path: &Path, rows: &[T]) -> AppResult<()> {
        fs::create_dir_all(self.config.data_dir())?;

        let staging = path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&staging)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&staging, path)?;
        Ok(())
    }
}

impl Storage for CsvStorage {
    fn read(&self, kind: EntityKind) -> AppResult<Rows> {
        let path = self.path_for(kind);
        let rows = match kind {
            EntityKind::Employees => Rows::Employees(Self::read_rows(&path)?),
            EntityKind::Departments => Rows::Departments(Self::read_rows(&path)?),
            EntityKind::Permissions => Rows::Permissions(Self::read_rows(&path)?),
            EntityKind::Users => Rows::Users(Self::read_rows(&path)?),
        };
        debug!(kind = %kind, rows = rows.len(), path = %path.display(), "Read rows");
        Ok(rows)
    }

    fn write(&self, rows: &Rows) -> AppResult<()> {
        let path = self.path_for(rows.kind());
        match rows {
            Rows::Employees(r) => self.write_rows(&path, r)?,
            Rows::Departments(r) => self.write_rows(&path, r)?,
            Rows::Permissions(r) => self.write_rows(&path, r)?,
            Rows::Users(r) => self.write_rows(&path, r)?,
        }
        debug!(kind = %rows.kind(), rows = rows.len(), path = %path.display(), "Wrote rows");
        Ok(())
    }
}
