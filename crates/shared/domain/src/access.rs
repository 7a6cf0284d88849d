//! Field-level view/edit resolution for employee records.
//!
//! Pure functions of the caller and the target; re-evaluate whenever
//! either changes.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::constants::{
    PERMISSION_FINANCE_EDIT, PERMISSION_HR_READ, PERMISSION_HR_WRITE, PERMISSION_PAYROLL,
    SUPERUSER_PERMISSION,
};
use crate::employee::{Employee, EmployeeField};
use crate::error::{DomainError, DomainResult};

/// The attribute universe the resolver gates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeAttribute {
    Name,
    Role,
    StartDate,
    Salary,
    Address,
}

impl EmployeeAttribute {
    pub const ALL: [EmployeeAttribute; 5] = [
        EmployeeAttribute::Name,
        EmployeeAttribute::Role,
        EmployeeAttribute::StartDate,
        EmployeeAttribute::Salary,
        EmployeeAttribute::Address,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeAttribute::Name => "name",
            EmployeeAttribute::Role => "role",
            EmployeeAttribute::StartDate => "start_date",
            EmployeeAttribute::Salary => "salary",
            EmployeeAttribute::Address => "address",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// Render this attribute's value from an employee record
    pub fn value_of(&self, employee: &Employee) -> String {
        match self {
            EmployeeAttribute::Name => employee.name.clone(),
            EmployeeAttribute::Role => employee.role.clone(),
            EmployeeAttribute::StartDate => employee.start_date.format("%Y-%m-%d").to_string(),
            EmployeeAttribute::Salary => employee.salary.to_string(),
            EmployeeAttribute::Address => employee.address.clone(),
        }
    }
}

impl fmt::Display for EmployeeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, duplicate-free set of capability names held by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the set satisfies `required`. The superuser capability
    /// satisfies every check.
    pub fn has(&self, required: &str) -> bool {
        self.0.contains(SUPERUSER_PERMISSION) || self.0.contains(required)
    }

    /// Literal membership, without the superuser override
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_superuser(&self) -> bool {
        self.0.contains(SUPERUSER_PERMISSION)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        f.write_str(&names.join(", "))
    }
}

/// Who is asking: the authenticated employee id (if any) and their capabilities
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub id: Option<String>,
    pub permissions: PermissionSet,
}

impl Caller {
    pub fn new(id: impl Into<String>, permissions: PermissionSet) -> Self {
        Self {
            id: Some(id.into()),
            permissions,
        }
    }

    /// Caller with capabilities but no identity
    pub fn anonymous(permissions: PermissionSet) -> Self {
        Self {
            id: None,
            permissions,
        }
    }

    pub fn is(&self, employee_id: &str) -> bool {
        self.id.as_deref() == Some(employee_id)
    }
}

/// Visible and editable attributes for one caller/target pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldAccess {
    pub visible: BTreeSet<EmployeeAttribute>,
    pub editable: BTreeSet<EmployeeAttribute>,
}

impl FieldAccess {
    pub fn can_view(&self, attribute: EmployeeAttribute) -> bool {
        self.visible.contains(&attribute)
    }

    pub fn can_edit(&self, attribute: EmployeeAttribute) -> bool {
        self.editable.contains(&attribute)
    }

    /// Check a requested update against the edit rights.
    ///
    /// `enabled` is not part of the attribute matrix; it needs the
    /// superuser capability.
    pub fn check_edit(&self, caller: &Caller, field: &EmployeeField) -> DomainResult<()> {
        let allowed = match field {
            EmployeeField::Name(_) => self.can_edit(EmployeeAttribute::Name),
            EmployeeField::Role(_) => self.can_edit(EmployeeAttribute::Role),
            EmployeeField::StartDate(_) => self.can_edit(EmployeeAttribute::StartDate),
            EmployeeField::Salary(_) => self.can_edit(EmployeeAttribute::Salary),
            EmployeeField::Address(_) => self.can_edit(EmployeeAttribute::Address),
            EmployeeField::Enabled(_) => can_manage_records(caller),
        };
        if allowed {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!("edit {}", field.name())))
        }
    }
}

/// Resolve which attributes of `target` the caller may see and edit.
pub fn resolve_field_access(caller: &Caller, target: &Employee) -> FieldAccess {
    let visible = if caller.is(target.id()) {
        EmployeeAttribute::ALL.into_iter().collect()
    } else {
        visible_on_others(&caller.permissions)
    };

    FieldAccess {
        visible,
        editable: editable_attributes(&caller.permissions),
    }
}

/// Attributes visible on records other than the caller's own
pub fn visible_on_others(perms: &PermissionSet) -> BTreeSet<EmployeeAttribute> {
    use EmployeeAttribute::*;

    if perms.has(PERMISSION_HR_WRITE) {
        EmployeeAttribute::ALL.into_iter().collect()
    } else if perms.has(PERMISSION_PAYROLL) || perms.has(PERMISSION_FINANCE_EDIT) {
        [Name, Role, Salary].into_iter().collect()
    } else if perms.has(PERMISSION_HR_READ) {
        [Name, Role, Address].into_iter().collect()
    } else {
        [Name, Role].into_iter().collect()
    }
}

/// Attributes the capabilities allow editing, on any record
pub fn editable_attributes(perms: &PermissionSet) -> BTreeSet<EmployeeAttribute> {
    if perms.has(PERMISSION_HR_WRITE) {
        EmployeeAttribute::ALL.into_iter().collect()
    } else if perms.has(PERMISSION_FINANCE_EDIT) {
        [EmployeeAttribute::Salary].into_iter().collect()
    } else {
        BTreeSet::new()
    }
}

/// Callers may always change their own password; the superuser may
/// reset anyone's.
pub fn can_change_password(caller: &Caller, target_id: &str) -> bool {
    caller.is(target_id) || caller.permissions.is_superuser()
}

/// Gate for creating or deleting records and changing memberships or grants
pub fn can_manage_records(caller: &Caller) -> bool {
    caller.permissions.has(PERMISSION_HR_WRITE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::tests::new_employee;
    use crate::constants::PERMISSION_IT_ADMIN;

    fn target() -> Employee {
        Employee::create("emp_aaaaaaaa".to_string(), new_employee()).unwrap()
    }

    fn other(perms: &[&str]) -> Caller {
        Caller::new("emp_bbbbbbbb", perms.iter().copied().collect())
    }

    fn set(attrs: &[EmployeeAttribute]) -> BTreeSet<EmployeeAttribute> {
        attrs.iter().copied().collect()
    }

    #[test]
    fn test_self_view_sees_everything_edits_nothing() {
        let target = target();
        let caller = Caller::new(target.id(), PermissionSet::new());
        let access = resolve_field_access(&caller, &target);

        assert_eq!(access.visible, set(&EmployeeAttribute::ALL));
        assert!(access.editable.is_empty());
    }

    #[test]
    fn test_superuser_sees_and_edits_everything() {
        let access = resolve_field_access(&other(&[PERMISSION_HR_WRITE]), &target());

        assert_eq!(access.visible, set(&EmployeeAttribute::ALL));
        assert_eq!(access.editable, set(&EmployeeAttribute::ALL));
    }

    #[test]
    fn test_finance_edit_sees_salary_edits_salary() {
        use EmployeeAttribute::*;
        let access = resolve_field_access(&other(&[PERMISSION_FINANCE_EDIT]), &target());

        assert_eq!(access.visible, set(&[Name, Role, Salary]));
        assert_eq!(access.editable, set(&[Salary]));
    }

    #[test]
    fn test_payroll_sees_salary_only() {
        use EmployeeAttribute::*;
        let access = resolve_field_access(&other(&[PERMISSION_PAYROLL]), &target());

        assert_eq!(access.visible, set(&[Name, Role, Salary]));
        assert!(access.editable.is_empty());
    }

    #[test]
    fn test_payroll_takes_precedence_over_hr_read() {
        use EmployeeAttribute::*;
        let access = resolve_field_access(
            &other(&[PERMISSION_HR_READ, PERMISSION_PAYROLL]),
            &target(),
        );
        assert_eq!(access.visible, set(&[Name, Role, Salary]));
    }

    #[test]
    fn test_hr_read_sees_address() {
        use EmployeeAttribute::*;
        let access = resolve_field_access(&other(&[PERMISSION_HR_READ]), &target());

        assert_eq!(access.visible, set(&[Name, Role, Address]));
        assert!(access.editable.is_empty());
    }

    #[test]
    fn test_no_capabilities_sees_name_and_role() {
        use EmployeeAttribute::*;
        let access = resolve_field_access(&other(&[]), &target());

        assert_eq!(access.visible, set(&[Name, Role]));
        assert!(access.editable.is_empty());

        let unrelated = resolve_field_access(&other(&[PERMISSION_IT_ADMIN]), &target());
        assert_eq!(unrelated, access);
    }

    #[test]
    fn test_superuser_override_satisfies_any_check() {
        let perms: PermissionSet = [PERMISSION_HR_WRITE].into_iter().collect();
        assert!(perms.has(PERMISSION_PAYROLL));
        assert!(perms.has("anything_at_all"));
        assert!(!perms.contains(PERMISSION_PAYROLL));
    }

    #[test]
    fn test_password_change_gate() {
        let target = target();
        assert!(can_change_password(&Caller::new(target.id(), PermissionSet::new()), target.id()));
        assert!(can_change_password(&other(&[PERMISSION_HR_WRITE]), target.id()));
        assert!(!can_change_password(&other(&[PERMISSION_FINANCE_EDIT]), target.id()));
        assert!(!can_change_password(&Caller::default(), target.id()));
    }

    #[test]
    fn test_attribute_names() {
        assert_eq!(
            EmployeeAttribute::from_name("start_date"),
            Some(EmployeeAttribute::StartDate)
        );
        assert_eq!(EmployeeAttribute::from_name("enabled"), None);
    }

    #[test]
    fn test_check_edit() {
        let caller = other(&[PERMISSION_FINANCE_EDIT]);
        let access = resolve_field_access(&caller, &target());

        assert!(access.check_edit(&caller, &EmployeeField::Salary(1)).is_ok());
        assert!(matches!(
            access.check_edit(&caller, &EmployeeField::Name("x".into())),
            Err(DomainError::Forbidden(_))
        ));
        assert!(access.check_edit(&caller, &EmployeeField::Enabled(false)).is_err());
    }
}
