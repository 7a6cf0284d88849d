//! Storage adapter boundary: one flat table per entity kind.

use std::fmt;

use common::AppResult;
use domain::{DepartmentRow, EmployeeRow, PermissionRow, UserRow};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// The persisted entity collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Employees,
    Departments,
    Permissions,
    Users,
}

impl EntityKind {
    /// Load order: permissions before the employees that reference them.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Permissions,
        EntityKind::Employees,
        EntityKind::Departments,
        EntityKind::Users,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            EntityKind::Employees => "employees.csv",
            EntityKind::Departments => "departments.csv",
            EntityKind::Permissions => "permissions.csv",
            EntityKind::Users => "users.csv",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Employees => "employees",
            EntityKind::Departments => "departments",
            EntityKind::Permissions => "permissions",
            EntityKind::Users => "users",
        };
        f.write_str(name)
    }
}

/// Typed rows for one entity kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rows {
    Employees(Vec<EmployeeRow>),
    Departments(Vec<DepartmentRow>),
    Permissions(Vec<PermissionRow>),
    Users(Vec<UserRow>),
}

impl Rows {
    pub fn kind(&self) -> EntityKind {
        match self {
            Rows::Employees(_) => EntityKind::Employees,
            Rows::Departments(_) => EntityKind::Departments,
            Rows::Permissions(_) => EntityKind::Permissions,
            Rows::Users(_) => EntityKind::Users,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Rows::Employees(rows) => rows.len(),
            Rows::Departments(rows) => rows.len(),
            Rows::Permissions(rows) => rows.len(),
            Rows::Users(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empty collection of the given kind
    pub fn empty(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Employees => Rows::Employees(Vec::new()),
            EntityKind::Departments => Rows::Departments(Vec::new()),
            EntityKind::Permissions => Rows::Permissions(Vec::new()),
            EntityKind::Users => Rows::Users(Vec::new()),
        }
    }
}

/// Storage trait for dependency injection.
///
/// Implementations must fail `read` with `AppError::FileNotFound` when the
/// backing table does not exist yet, so bootstrap can tell "first run" apart
/// from other failures.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait Storage {
    /// Read every row of one entity kind
    fn read(&self, kind: EntityKind) -> AppResult<Rows>;

    /// Replace the stored rows of `rows.kind()`
    fn write(&self, rows: &Rows) -> AppResult<()>;
}
