//! Employee domain entity and related types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{EMPLOYEE_ID_PREFIX, LIST_SEPARATOR};
use crate::error::{DomainError, DomainResult};
use crate::ids::{check_id, require_id};
use crate::password::PasswordHash;
use crate::permission::validate_permission_name;

/// Updatable employee fields
pub const EMPLOYEE_FIELDS: &[&str] = &["name", "role", "start_date", "salary", "address", "enabled"];

/// Employee domain entity.
///
/// Fields are plain and mutable; [`Employee::validate`] is the single
/// place that checks them. The id is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    id: String,
    pub name: String,
    pub role: String,
    pub start_date: NaiveDate,
    pub salary: i64,
    pub address: String,
    pub password_hash: PasswordHash,
    pub permissions: Vec<String>,
    pub enabled: bool,
}

/// Employee creation data transfer object
#[derive(Clone, Deserialize, Validate)]
pub struct NewEmployee {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
    pub start_date: NaiveDate,
    #[validate(range(min = 0, message = "Salary must not be negative"))]
    pub salary: i64,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    /// Plaintext; hashed on creation and never stored
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

// Keep the plaintext password out of debug output
impl std::fmt::Debug for NewEmployee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewEmployee")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("start_date", &self.start_date)
            .field("salary", &self.salary)
            .field("address", &self.address)
            .field("password", &"[REDACTED]")
            .field("permissions", &self.permissions)
            .finish()
    }
}

impl NewEmployee {
    /// Build from raw form text, trimming and parsing each field.
    pub fn from_form(
        name: &str,
        role: &str,
        start_date: &str,
        salary: &str,
        address: &str,
        password: &str,
    ) -> DomainResult<Self> {
        let draft = Self {
            name: name.trim().to_string(),
            role: role.trim().to_string(),
            start_date: parse_start_date(start_date)?,
            salary: parse_salary(salary)?,
            address: address.trim().to_string(),
            password: password.to_string(),
            permissions: Vec::new(),
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}

/// A single-field employee update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeField {
    Name(String),
    Role(String),
    StartDate(NaiveDate),
    Salary(i64),
    Address(String),
    Enabled(bool),
}

impl EmployeeField {
    /// Parse a field name and raw text value.
    ///
    /// # Errors
    /// Unknown field names and unparsable values are validation errors.
    pub fn parse(field: &str, raw: &str) -> DomainResult<Self> {
        match field {
            "name" => Ok(EmployeeField::Name(raw.trim().to_string())),
            "role" => Ok(EmployeeField::Role(raw.trim().to_string())),
            "start_date" => parse_start_date(raw).map(EmployeeField::StartDate),
            "salary" => parse_salary(raw).map(EmployeeField::Salary),
            "address" => Ok(EmployeeField::Address(raw.trim().to_string())),
            "enabled" => raw
                .trim()
                .parse()
                .map(EmployeeField::Enabled)
                .map_err(|_| DomainError::validation("Enabled must be true or false")),
            other => Err(DomainError::validation(format!(
                "Unknown employee field '{}', expected one of: {}",
                other,
                EMPLOYEE_FIELDS.join(", ")
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EmployeeField::Name(_) => "name",
            EmployeeField::Role(_) => "role",
            EmployeeField::StartDate(_) => "start_date",
            EmployeeField::Salary(_) => "salary",
            EmployeeField::Address(_) => "address",
            EmployeeField::Enabled(_) => "enabled",
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_start_date(raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::validation("Start date must be YYYY-MM-DD"))
}

/// Parse a whole-number salary.
pub fn parse_salary(raw: &str) -> DomainResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| DomainError::validation("Salary must be an integer"))
}

impl Employee {
    /// Create a new employee under an already-allocated id.
    pub fn create(id: String, new: NewEmployee) -> DomainResult<Self> {
        new.validate()?;
        let employee = Self {
            id,
            name: new.name,
            role: new.role,
            start_date: new.start_date,
            salary: new.salary,
            address: new.address,
            password_hash: PasswordHash::new(&new.password)?,
            permissions: new.permissions,
            enabled: true,
        };
        employee.validate()?;
        Ok(employee)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Check every field invariant.
    pub fn validate(&self) -> DomainResult<()> {
        require_id(&self.id, EMPLOYEE_ID_PREFIX, "Employee id")?;
        require_text(&self.name, "Name")?;
        require_text(&self.role, "Role")?;
        require_text(&self.address, "Address")?;
        if self.salary < 0 {
            return Err(DomainError::validation("Salary must not be negative"));
        }
        for (idx, name) in self.permissions.iter().enumerate() {
            validate_permission_name(name)?;
            if self.permissions[..idx].contains(name) {
                return Err(DomainError::validation(format!(
                    "Permission '{}' listed more than once",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Apply a set of field updates atomically.
    ///
    /// On error the employee is left unchanged.
    pub fn update(&mut self, fields: Vec<EmployeeField>) -> DomainResult<()> {
        let mut updated = self.clone();
        for field in fields {
            updated.apply(field);
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn apply(&mut self, field: EmployeeField) {
        match field {
            EmployeeField::Name(name) => self.name = name,
            EmployeeField::Role(role) => self.role = role,
            EmployeeField::StartDate(date) => self.start_date = date,
            EmployeeField::Salary(salary) => self.salary = salary,
            EmployeeField::Address(address) => self.address = address,
            EmployeeField::Enabled(enabled) => self.enabled = enabled,
        }
    }

    /// Raise salary by a percentage, rounding half to even.
    pub fn salary_bump(&mut self, uplift_percentage: f64) -> DomainResult<()> {
        let bumped = (self.salary as f64 * (1.0 + uplift_percentage / 100.0)).round_ties_even();
        if !bumped.is_finite() || bumped < 0.0 || bumped > i64::MAX as f64 {
            return Err(DomainError::validation(format!(
                "Salary uplift of {}% is out of range",
                uplift_percentage
            )));
        }
        self.salary = bumped as i64;
        Ok(())
    }

    pub fn toggle_enabled(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p == name)
    }

    pub fn grant(&mut self, name: &str) -> DomainResult<()> {
        validate_permission_name(name)?;
        if self.has_permission(name) {
            return Err(DomainError::duplicate(format!(
                "Permission '{}' on employee {}",
                name, self.id
            )));
        }
        self.permissions.push(name.to_string());
        Ok(())
    }

    pub fn revoke(&mut self, name: &str) -> DomainResult<()> {
        let before = self.permissions.len();
        self.permissions.retain(|p| p != name);
        if self.permissions.len() == before {
            return Err(DomainError::not_found(format!(
                "Permission '{}' on employee {}",
                name, self.id
            )));
        }
        Ok(())
    }
}

fn require_text(value: &str, field: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        Err(DomainError::validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

/// Storage row for an employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRow {
    pub id: String,
    pub name: String,
    pub role: String,
    pub start_date: NaiveDate,
    pub salary: i64,
    pub address: String,
    pub password_hash: String,
    /// Space-joined permission names
    pub permissions: String,
    pub enabled: bool,
}

impl From<&Employee> for EmployeeRow {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id.clone(),
            name: employee.name.clone(),
            role: employee.role.clone(),
            start_date: employee.start_date,
            salary: employee.salary,
            address: employee.address.clone(),
            password_hash: employee.password_hash.as_str().to_string(),
            permissions: employee.permissions.join(LIST_SEPARATOR),
            enabled: employee.enabled,
        }
    }
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = DomainError;

    fn try_from(row: EmployeeRow) -> DomainResult<Self> {
        if !check_id(&row.id, EMPLOYEE_ID_PREFIX) {
            return Err(DomainError::corrupt(format!(
                "employee row has malformed id '{}'",
                row.id
            )));
        }
        let password_hash = PasswordHash::parse(&row.password_hash)
            .map_err(|_| DomainError::corrupt(format!("employee {} has an invalid password hash", row.id)))?;
        let employee = Self {
            id: row.id,
            name: row.name,
            role: row.role,
            start_date: row.start_date,
            salary: row.salary,
            address: row.address,
            password_hash,
            permissions: row.permissions.split_whitespace().map(str::to_string).collect(),
            enabled: row.enabled,
        };
        employee
            .validate()
            .map_err(|e| DomainError::corrupt(format!("employee {}: {}", employee.id, e)))?;
        Ok(employee)
    }
}
