//! Department domain entity.
//!
//! Parent links are stored as department ids in a flat table. Nothing here
//! assumes the links form a tree; [`find_parent_cycle`] is the explicit check.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{DEPARTMENT_ID_PREFIX, EMPLOYEE_ID_PREFIX, LIST_SEPARATOR};
use crate::error::{DomainError, DomainResult};
use crate::ids::{check_id, require_id};

/// Updatable department fields
pub const DEPARTMENT_FIELDS: &[&str] = &["name", "description", "head_of_department", "parent_department"];

/// Department domain entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    id: String,
    pub name: String,
    pub description: String,
    /// Employee id of the head (reference, not ownership)
    pub head_of_department: String,
    pub parent_department: Option<String>,
    members: Vec<String>,
}

/// Department creation data transfer object
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewDepartment {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Head of Department is required"))]
    pub head_of_department: String,
    #[serde(default)]
    pub parent_department: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

/// A single-field department update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartmentField {
    Name(String),
    Description(String),
    HeadOfDepartment(String),
    ParentDepartment(Option<String>),
}

impl DepartmentField {
    /// Parse a field name and raw text value. An empty parent clears it.
    pub fn parse(field: &str, raw: &str) -> DomainResult<Self> {
        let value = raw.trim();
        match field {
            "name" => Ok(DepartmentField::Name(value.to_string())),
            "description" => Ok(DepartmentField::Description(value.to_string())),
            "head_of_department" => Ok(DepartmentField::HeadOfDepartment(value.to_string())),
            "parent_department" => Ok(DepartmentField::ParentDepartment(
                (!value.is_empty()).then(|| value.to_string()),
            )),
            other => Err(DomainError::validation(format!(
                "Unknown department field '{}', expected one of: {}",
                other,
                DEPARTMENT_FIELDS.join(", ")
            ))),
        }
    }
}

impl Department {
    /// Create a department under an already-allocated id.
    pub fn create(id: String, new: NewDepartment) -> DomainResult<Self> {
        new.validate()?;
        let department = Self {
            id,
            name: new.name,
            description: new.description,
            head_of_department: new.head_of_department,
            parent_department: new.parent_department,
            members: new.members,
        };
        department.validate()?;
        Ok(department)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Check field shapes. Referenced records are not checked for existence.
    pub fn validate(&self) -> DomainResult<()> {
        require_id(&self.id, DEPARTMENT_ID_PREFIX, "Department id")?;
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Name is required"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("Description is required"));
        }
        require_id(&self.head_of_department, EMPLOYEE_ID_PREFIX, "Head of department")?;
        if let Some(parent) = &self.parent_department {
            require_id(parent, DEPARTMENT_ID_PREFIX, "Parent department")?;
            if parent == &self.id {
                return Err(DomainError::validation("A department cannot be its own parent"));
            }
        }
        for (idx, member) in self.members.iter().enumerate() {
            require_id(member, EMPLOYEE_ID_PREFIX, "Member")?;
            if self.members[..idx].contains(member) {
                return Err(DomainError::duplicate(format!(
                    "Member {} in department {}",
                    member, self.id
                )));
            }
        }
        Ok(())
    }

    /// Apply a set of field updates atomically.
    pub fn update(&mut self, fields: Vec<DepartmentField>) -> DomainResult<()> {
        let mut updated = self.clone();
        for field in fields {
            match field {
                DepartmentField::Name(name) => updated.name = name,
                DepartmentField::Description(description) => updated.description = description,
                DepartmentField::HeadOfDepartment(head) => updated.head_of_department = head,
                DepartmentField::ParentDepartment(parent) => updated.parent_department = parent,
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn has_member(&self, employee_id: &str) -> bool {
        self.members.iter().any(|m| m == employee_id)
    }

    pub fn add_member(&mut self, employee_id: &str) -> DomainResult<()> {
        require_id(employee_id, EMPLOYEE_ID_PREFIX, "Member")?;
        if self.has_member(employee_id) {
            return Err(DomainError::duplicate(format!(
                "Member {} in department {}",
                employee_id, self.id
            )));
        }
        self.members.push(employee_id.to_string());
        Ok(())
    }

    pub fn remove_member(&mut self, employee_id: &str) -> DomainResult<()> {
        require_id(employee_id, EMPLOYEE_ID_PREFIX, "Member")?;
        let before = self.members.len();
        self.members.retain(|m| m != employee_id);
        if self.members.len() == before {
            return Err(DomainError::not_found(format!(
                "Member {} in department {}",
                employee_id, self.id
            )));
        }
        Ok(())
    }
}

/// Follow parent links from `start` and return the cycle, if any.
///
/// The returned path starts and ends at the first revisited department.
/// A missing parent ends the walk without a cycle.
pub fn find_parent_cycle(
    departments: &BTreeMap<String, Department>,
    start: &str,
) -> Option<Vec<String>> {
    let mut path: Vec<String> = Vec::new();
    let mut current = Some(start.to_string());

    while let Some(id) = current {
        if let Some(pos) = path.iter().position(|seen| seen == &id) {
            let mut cycle = path.split_off(pos);
            cycle.push(id);
            return Some(cycle);
        }
        current = departments
            .get(&id)
            .and_then(|department| department.parent_department.clone());
        path.push(id);
    }
    None
}

/// Storage row for a department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub head_of_department: String,
    /// Empty when the department has no parent
    pub parent_department: String,
    /// Space-joined employee ids
    pub members: String,
}

impl From<&Department> for DepartmentRow {
    fn from(department: &Department) -> Self {
        Self {
            id: department.id.clone(),
            name: department.name.clone(),
            description: department.description.clone(),
            head_of_department: department.head_of_department.clone(),
            parent_department: department.parent_department.clone().unwrap_or_default(),
            members: department.members.join(LIST_SEPARATOR),
        }
    }
}

impl TryFrom<DepartmentRow> for Department {
    type Error = DomainError;

    fn try_from(row: DepartmentRow) -> DomainResult<Self> {
        if !check_id(&row.id, DEPARTMENT_ID_PREFIX) {
            return Err(DomainError::corrupt(format!(
                "department row has malformed id '{}'",
                row.id
            )));
        }
        let parent = row.parent_department.trim();
        let department = Self {
            id: row.id.clone(),
            name: row.name,
            description: row.description,
            head_of_department: row.head_of_department,
            parent_department: (!parent.is_empty()).then(|| parent.to_string()),
            members: row.members.split_whitespace().map(str::to_string).collect(),
        };
        department
            .validate()
            .map_err(|e| DomainError::corrupt(format!("department {}: {}", row.id, e)))?;
        Ok(department)
    }
}
