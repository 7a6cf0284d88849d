//! Domain layer - Core entities, value objects and access rules.
//!
//! This crate contains pure domain logic with no storage or I/O.
//! Everything here is shared by the tracker service and the CLI.

pub mod access;
pub mod constants;
pub mod department;
pub mod employee;
pub mod error;
pub mod filter;
pub mod ids;
pub mod password;
pub mod permission;
pub mod user;

pub use access::{
    can_change_password, can_manage_records, editable_attributes, resolve_field_access,
    visible_on_others, Caller, EmployeeAttribute, FieldAccess, PermissionSet,
};
pub use constants::*;
pub use department::{find_parent_cycle, Department, DepartmentField, DepartmentRow, NewDepartment};
pub use employee::{Employee, EmployeeField, EmployeeRow, NewEmployee};
pub use error::{DomainError, DomainResult};
pub use filter::{filter_records, FieldValue, Filterable, Ordinal, Predicate};
pub use ids::{check_id, new_id, require_id};
pub use password::{hash_password, is_valid_stored_password_hash, verify_password, PasswordHash};
pub use permission::{Permission, PermissionRow};
pub use user::{User, UserRow};
