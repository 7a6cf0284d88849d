//! Repository layer for persisted state.

mod csv_storage;
mod storage;

pub use csv_storage::CsvStorage;
pub use storage::{EntityKind, Rows, Storage};

#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockStorage;
