//! Permission entity: a named, flat capability.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Named capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub name: String,
    pub active: bool,
}

impl Permission {
    /// Create a new active permission
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let permission = Self {
            name: name.into(),
            active: true,
        };
        permission.validate()?;
        Ok(permission)
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_permission_name(&self.name)
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

/// Permission names are stored space-joined, so they must be non-empty
/// and free of whitespace.
pub fn validate_permission_name(name: &str) -> DomainResult<()> {
    if name.is_empty() {
        return Err(DomainError::validation("Permission name is required"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(format!(
            "Permission name '{}' must not contain whitespace",
            name
        )));
    }
    Ok(())
}

/// Storage row for a permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRow {
    pub name: String,
    pub active: bool,
}

impl From<&Permission> for PermissionRow {
    fn from(permission: &Permission) -> Self {
        Self {
            name: permission.name.clone(),
            active: permission.active,
        }
    }
}

impl TryFrom<PermissionRow> for Permission {
    type Error = DomainError;

    fn try_from(row: PermissionRow) -> DomainResult<Self> {
        let permission = Self {
            name: row.name,
            active: row.active,
        };
        permission
            .validate()
            .map_err(|e| DomainError::corrupt(format!("permission row: {}", e)))?;
        Ok(permission)
    }
}
