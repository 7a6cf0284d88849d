//! Tracker - the in-memory aggregate root.
//!
//! Owns every registry and checks the cross-entity rules that individual
//! records cannot see (references must exist, heads cannot be deleted,
//! granted permissions must be registered).

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use common::{AppError, AppResult, OptionExt};
use domain::{
    filter_records, find_parent_cycle, new_id, require_id, Department, DepartmentField,
    DepartmentRow, Employee, EmployeeField, EmployeeRow, NewDepartment, NewEmployee, PasswordHash,
    Permission, PermissionRow, PermissionSet, Predicate, User, UserRow, DEPARTMENT_ID_PREFIX,
    EMPLOYEE_ID_PREFIX,
};

use crate::repository::{EntityKind, Rows, Storage};

/// All records of one installation.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    employees: BTreeMap<String, Employee>,
    departments: BTreeMap<String, Department>,
    permissions: BTreeMap<String, Permission>,
    users: BTreeMap<String, User>,
}

/// Draw ids until one is free in `registry`.
fn allocate_id<V>(registry: &BTreeMap<String, V>, prefix: &str) -> String {
    loop {
        let id = new_id(prefix);
        if !registry.contains_key(&id) {
            return id;
        }
        debug!(id = %id, "Identifier collision, redrawing");
    }
}

fn employee_label(id: &str) -> String {
    format!("Employee {}", id)
}

fn department_label(id: &str) -> String {
    format!("Department {}", id)
}

fn permission_label(name: &str) -> String {
    format!("Permission '{}'", name)
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Employees
    // =========================================================================

    /// Register a new employee and its login credential. Returns the new id.
    pub fn create_employee(&mut self, new: NewEmployee) -> AppResult<String> {
        for name in &new.permissions {
            self.require_permission(name)?;
        }

        let id = allocate_id(&self.employees, EMPLOYEE_ID_PREFIX);
        let employee = Employee::create(id.clone(), new)?;
        let user = User::new(id.clone(), employee.password_hash.clone())?;

        debug!(id = %id, name = %employee.name, "Created employee");
        self.employees.insert(id.clone(), employee);
        self.users.insert(id.clone(), user);
        Ok(id)
    }

    pub fn get_employee(&self, id: &str) -> AppResult<&Employee> {
        require_id(id, EMPLOYEE_ID_PREFIX, "Employee id")?;
        self.employees.get(id).ok_or_not_found(employee_label(id))
    }

    fn employee_mut(&mut self, id: &str) -> AppResult<&mut Employee> {
        require_id(id, EMPLOYEE_ID_PREFIX, "Employee id")?;
        self.employees.get_mut(id).ok_or_not_found(employee_label(id))
    }

    /// Employees matching every predicate, ordered by id
    pub fn list_employees(&self, predicates: &[Predicate]) -> AppResult<Vec<&Employee>> {
        Ok(filter_records(self.employees.values(), predicates)?)
    }

    /// Apply a sparse update; nothing changes if any field is rejected.
    pub fn update_employee(&mut self, id: &str, fields: Vec<EmployeeField>) -> AppResult<()> {
        let employee = self.employee_mut(id)?;
        let changed: Vec<&'static str> = fields.iter().map(EmployeeField::name).collect();
        employee.update(fields)?;
        debug!(id = %id, fields = ?changed, "Updated employee");
        Ok(())
    }

    /// Remove an employee, its credential and its memberships.
    ///
    /// # Errors
    /// Fails while the employee still heads a department.
    pub fn delete_employee(&mut self, id: &str) -> AppResult<Employee> {
        self.get_employee(id)?;

        if let Some(department) = self
            .departments
            .values()
            .find(|d| d.head_of_department == id)
        {
            return Err(AppError::validation(format!(
                "Employee {} is head of department {} ({}); assign a new head first",
                id,
                department.id(),
                department.name
            )));
        }

        for department in self.departments.values_mut() {
            if department.has_member(id) {
                department.remove_member(id)?;
            }
        }
        self.users.remove(id);
        let employee = self.employees.remove(id).ok_or_not_found(employee_label(id))?;

        debug!(id = %id, "Deleted employee");
        Ok(employee)
    }

    /// Replace an employee's password on both the record and its credential.
    pub fn set_password(&mut self, id: &str, new_password: &str) -> AppResult<()> {
        let hash = PasswordHash::new(new_password)?;
        let employee = self.employee_mut(id)?;
        employee.password_hash = hash.clone();

        match self.users.get_mut(id) {
            Some(user) => user.set_password_hash(hash),
            None => {
                warn!(id = %id, "Employee had no credential record, creating one");
                self.users.insert(id.to_string(), User::new(id, hash)?);
            }
        }
        debug!(id = %id, "Password changed");
        Ok(())
    }

    /// Raise salary by a percentage. Returns the new salary.
    pub fn bump_salary(&mut self, id: &str, uplift_percentage: f64) -> AppResult<i64> {
        let employee = self.employee_mut(id)?;
        employee.salary_bump(uplift_percentage)?;
        debug!(id = %id, salary = employee.salary, "Salary bumped");
        Ok(employee.salary)
    }

    /// Flip the enabled flag. Returns the new state.
    pub fn toggle_employee_enabled(&mut self, id: &str) -> AppResult<bool> {
        let employee = self.employee_mut(id)?;
        employee.toggle_enabled();
        debug!(id = %id, enabled = employee.enabled, "Toggled employee");
        Ok(employee.enabled)
    }

    pub fn grant_permission(&mut self, id: &str, permission: &str) -> AppResult<()> {
        self.require_permission(permission)?;
        self.employee_mut(id)?.grant(permission)?;
        debug!(id = %id, permission = %permission, "Granted permission");
        Ok(())
    }

    pub fn revoke_permission(&mut self, id: &str, permission: &str) -> AppResult<()> {
        self.employee_mut(id)?.revoke(permission)?;
        debug!(id = %id, permission = %permission, "Revoked permission");
        Ok(())
    }

    /// Effective capabilities of an employee.
    ///
    /// Deactivated or unregistered permissions are left out.
    pub fn permissions_for(&self, id: &str) -> AppResult<PermissionSet> {
        let employee = self.get_employee(id)?;
        Ok(employee
            .permissions
            .iter()
            .filter(|name| self.permissions.get(name.as_str()).is_some_and(|p| p.active))
            .cloned()
            .collect())
    }

    // =========================================================================
    // Departments
    // =========================================================================

    /// Register a department after checking that every reference exists.
    pub fn create_department(&mut self, new: NewDepartment) -> AppResult<String> {
        let id = allocate_id(&self.departments, DEPARTMENT_ID_PREFIX);
        let department = Department::create(id.clone(), new)?;
        self.check_department_references(&department)?;

        debug!(id = %id, name = %department.name, "Created department");
        self.departments.insert(id.clone(), department);
        Ok(id)
    }

    pub fn get_department(&self, id: &str) -> AppResult<&Department> {
        require_id(id, DEPARTMENT_ID_PREFIX, "Department id")?;
        self.departments.get(id).ok_or_not_found(department_label(id))
    }

    fn department_mut(&mut self, id: &str) -> AppResult<&mut Department> {
        require_id(id, DEPARTMENT_ID_PREFIX, "Department id")?;
        self.departments
            .get_mut(id)
            .ok_or_not_found(department_label(id))
    }

    pub fn list_departments(&self, predicates: &[Predicate]) -> AppResult<Vec<&Department>> {
        Ok(filter_records(self.departments.values(), predicates)?)
    }

    /// Apply a sparse update; nothing changes if any field is rejected.
    pub fn update_department(&mut self, id: &str, fields: Vec<DepartmentField>) -> AppResult<()> {
        let mut updated = self.get_department(id)?.clone();
        updated.update(fields)?;
        self.check_department_references(&updated)?;
        self.departments.insert(id.to_string(), updated);

        if let Some(cycle) = find_parent_cycle(&self.departments, id) {
            warn!(id = %id, cycle = %cycle.join(" -> "), "Department parents now form a cycle");
        }
        debug!(id = %id, "Updated department");
        Ok(())
    }

    /// Remove a department.
    ///
    /// # Errors
    /// Fails while another department names it as parent.
    pub fn delete_department(&mut self, id: &str) -> AppResult<Department> {
        self.get_department(id)?;

        if let Some(child) = self
            .departments
            .values()
            .find(|d| d.parent_department.as_deref() == Some(id))
        {
            return Err(AppError::validation(format!(
                "Department {} is the parent of {} ({}); move it first",
                id,
                child.id(),
                child.name
            )));
        }

        let department = self
            .departments
            .remove(id)
            .ok_or_not_found(department_label(id))?;
        debug!(id = %id, "Deleted department");
        Ok(department)
    }

    pub fn add_employee_to_department(&mut self, department_id: &str, employee_id: &str) -> AppResult<()> {
        require_id(department_id, DEPARTMENT_ID_PREFIX, "Department id")?;
        self.get_employee(employee_id)?;
        self.department_mut(department_id)?.add_member(employee_id)?;
        debug!(department = %department_id, employee = %employee_id, "Added member");
        Ok(())
    }

    pub fn remove_employee_from_department(
        &mut self,
        department_id: &str,
        employee_id: &str,
    ) -> AppResult<()> {
        self.department_mut(department_id)?.remove_member(employee_id)?;
        debug!(department = %department_id, employee = %employee_id, "Removed member");
        Ok(())
    }

    /// Follow parent links from one department and report a cycle.
    pub fn find_department_cycle(&self, id: &str) -> AppResult<Option<Vec<String>>> {
        self.get_department(id)?;
        Ok(find_parent_cycle(&self.departments, id))
    }

    /// Every distinct parent cycle in the department table.
    pub fn department_cycles(&self) -> Vec<Vec<String>> {
        let mut seen: BTreeSet<BTreeSet<String>> = BTreeSet::new();
        let mut cycles = Vec::new();
        for id in self.departments.keys() {
            if let Some(cycle) = find_parent_cycle(&self.departments, id) {
                let members: BTreeSet<String> = cycle.iter().cloned().collect();
                if seen.insert(members) {
                    cycles.push(cycle);
                }
            }
        }
        cycles
    }

    fn check_department_references(&self, department: &Department) -> AppResult<()> {
        if !self.employees.contains_key(&department.head_of_department) {
            return Err(AppError::NotFound(format!(
                "Head of department {}",
                department.head_of_department
            )));
        }
        if let Some(parent) = &department.parent_department {
            if !self.departments.contains_key(parent) {
                return Err(AppError::NotFound(format!("Parent department {}", parent)));
            }
        }
        if let Some(missing) = department
            .members()
            .iter()
            .find(|m| !self.employees.contains_key(m.as_str()))
        {
            return Err(AppError::NotFound(format!("Member {}", missing)));
        }
        Ok(())
    }

    // =========================================================================
    // Permissions
    // =========================================================================

    pub fn create_permission(&mut self, name: &str) -> AppResult<()> {
        if self.permissions.contains_key(name) {
            return Err(AppError::Duplicate(permission_label(name)));
        }
        let permission = Permission::new(name)?;
        debug!(permission = %name, "Created permission");
        self.permissions.insert(name.to_string(), permission);
        Ok(())
    }

    pub fn get_permission(&self, name: &str) -> AppResult<&Permission> {
        self.permissions
            .get(name)
            .ok_or_not_found(permission_label(name))
    }

    fn require_permission(&self, name: &str) -> AppResult<()> {
        self.get_permission(name).map(|_| ())
    }

    pub fn list_permissions(&self, predicates: &[Predicate]) -> AppResult<Vec<&Permission>> {
        Ok(filter_records(self.permissions.values(), predicates)?)
    }

    pub fn set_permission_active(&mut self, name: &str, active: bool) -> AppResult<()> {
        let permission = self
            .permissions
            .get_mut(name)
            .ok_or_not_found(permission_label(name))?;
        if active {
            permission.activate();
        } else {
            permission.deactivate();
        }
        debug!(permission = %name, active, "Permission state changed");
        Ok(())
    }

    /// Remove a permission and revoke it from every holder.
    /// Returns the ids it was revoked from.
    pub fn delete_permission(&mut self, name: &str) -> AppResult<Vec<String>> {
        self.permissions
            .remove(name)
            .ok_or_not_found(permission_label(name))?;

        let mut revoked = Vec::new();
        for employee in self.employees.values_mut() {
            if employee.has_permission(name) {
                employee.revoke(name)?;
                revoked.push(employee.id().to_string());
            }
        }
        debug!(permission = %name, holders = revoked.len(), "Deleted permission");
        Ok(revoked)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Credential record for a login identifier
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    pub fn department_count(&self) -> usize {
        self.departments.len()
    }

    pub fn permission_count(&self) -> usize {
        self.permissions.len()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Rebuild a tracker from every stored table.
    ///
    /// Structural problems fail the load; dangling references are logged.
    pub fn load_from_storage(storage: &dyn Storage) -> AppResult<Self> {
        let mut tracker = Tracker::new();

        for kind in EntityKind::ALL {
            match storage.read(kind)? {
                Rows::Permissions(rows) => {
                    for row in rows {
                        let permission = Permission::try_from(row)?;
                        let name = permission.name.clone();
                        if tracker.permissions.insert(name.clone(), permission).is_some() {
                            return Err(AppError::CorruptData(format!(
                                "permission '{}' stored twice",
                                name
                            )));
                        }
                    }
                }
                Rows::Employees(rows) => {
                    for row in rows {
                        let employee = Employee::try_from(row)?;
                        let id = employee.id().to_string();
                        if tracker.employees.insert(id.clone(), employee).is_some() {
                            return Err(AppError::CorruptData(format!("employee {} stored twice", id)));
                        }
                    }
                }
                Rows::Departments(rows) => {
                    for row in rows {
                        let department = Department::try_from(row)?;
                        let id = department.id().to_string();
                        if tracker.departments.insert(id.clone(), department).is_some() {
                            return Err(AppError::CorruptData(format!(
                                "department {} stored twice",
                                id
                            )));
                        }
                    }
                }
                Rows::Users(rows) => {
                    for row in rows {
                        let user = User::try_from(row)?;
                        let id = user.id().to_string();
                        if tracker.users.insert(id.clone(), user).is_some() {
                            return Err(AppError::CorruptData(format!("user {} stored twice", id)));
                        }
                    }
                }
            }
        }

        for issue in tracker.integrity_issues() {
            warn!(issue = %issue, "Inconsistent stored data");
        }
        info!(
            employees = tracker.employees.len(),
            departments = tracker.departments.len(),
            permissions = tracker.permissions.len(),
            users = tracker.users.len(),
            "Loaded tracker"
        );
        Ok(tracker)
    }

    /// Write every table.
    pub fn save_to_storage(&self, storage: &dyn Storage) -> AppResult<()> {
        storage.write(&Rows::Permissions(
            self.permissions.values().map(PermissionRow::from).collect(),
        ))?;
        storage.write(&Rows::Employees(
            self.employees.values().map(EmployeeRow::from).collect(),
        ))?;
        storage.write(&Rows::Departments(
            self.departments.values().map(DepartmentRow::from).collect(),
        ))?;
        storage.write(&Rows::Users(self.users.values().map(UserRow::from).collect()))?;

        info!(
            employees = self.employees.len(),
            departments = self.departments.len(),
            permissions = self.permissions.len(),
            "Saved tracker"
        );
        Ok(())
    }

    /// Cross-table inconsistencies in loaded data.
    ///
    /// Login reads credentials from the user table, so a hash that differs
    /// from the employee record is reported too.
    fn integrity_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for department in self.departments.values() {
            if !self.employees.contains_key(&department.head_of_department) {
                issues.push(format!(
                    "department {} has unknown head {}",
                    department.id(),
                    department.head_of_department
                ));
            }
            if let Some(parent) = &department.parent_department {
                if !self.departments.contains_key(parent) {
                    issues.push(format!(
                        "department {} has unknown parent {}",
                        department.id(),
                        parent
                    ));
                }
            }
            for member in department.members() {
                if !self.employees.contains_key(member) {
                    issues.push(format!(
                        "department {} has unknown member {}",
                        department.id(),
                        member
                    ));
                }
            }
        }
        for employee in self.employees.values() {
            for name in &employee.permissions {
                if !self.permissions.contains_key(name) {
                    issues.push(format!(
                        "employee {} holds unknown permission '{}'",
                        employee.id(),
                        name
                    ));
                }
            }
            match self.users.get(employee.id()) {
                None => issues.push(format!("employee {} has no credential record", employee.id())),
                Some(user) if user.password_hash() != &employee.password_hash => issues.push(format!(
                    "employee {} password hash differs from its credential record",
                    employee.id()
                )),
                Some(_) => {}
            }
        }
        for id in self.users.keys() {
            if !self.employees.contains_key(id) {
                issues.push(format!("credential record {} has no employee", id));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockStorage;
    use chrono::NaiveDate;
    use domain::PERMISSION_PAYROLL;
    use std::sync::{Arc, Mutex};

    fn alice() -> NewEmployee {
        NewEmployee::from_form(
            "Alice",
            "HR Manager",
            "2021-04-12",
            "52000",
            "10 King Street, London",
            "password",
        )
        .unwrap()
    }

    fn bob() -> NewEmployee {
        NewEmployee::from_form("Bob", "Engineer", "2022-01-01", "40000", "1 Road", "password")
            .unwrap()
    }

    fn department(head: &str) -> NewDepartment {
        NewDepartment {
            name: "Finance".to_string(),
            description: "Budgets".to_string(),
            head_of_department: head.to_string(),
            parent_department: None,
            members: vec![head.to_string()],
        }
    }

    /// Storage double backed by a shared in-memory map
    fn memory_storage() -> MockStorage {
        let tables: Arc<Mutex<Vec<Rows>>> = Arc::new(Mutex::new(Vec::new()));
        let mut storage = MockStorage::new();

        let written = Arc::clone(&tables);
        storage.expect_write().returning(move |rows| {
            let mut tables = written.lock().unwrap();
            tables.retain(|t| t.kind() != rows.kind());
            tables.push(rows.clone());
            Ok(())
        });
        let read = Arc::clone(&tables);
        storage.expect_read().returning(move |kind| {
            read.lock()
                .unwrap()
                .iter()
                .find(|t| t.kind() == kind)
                .cloned()
                .ok_or_else(|| AppError::FileNotFound(kind.file_name().into()))
        });
        storage
    }

    #[test]
    fn test_create_employee_creates_credential() {
        let mut tracker = Tracker::new();
        let id = tracker.create_employee(alice()).unwrap();

        assert!(domain::check_id(&id, EMPLOYEE_ID_PREFIX));
        let user = tracker.user(&id).unwrap();
        assert!(user.verify("password"));
    }

    #[test]
    fn test_create_employee_requires_known_permissions() {
        let mut tracker = Tracker::new();
        let err = tracker
            .create_employee(alice().with_permissions([PERMISSION_PAYROLL]))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(tracker.employee_count(), 0);

        tracker.create_permission(PERMISSION_PAYROLL).unwrap();
        let id = tracker
            .create_employee(alice().with_permissions([PERMISSION_PAYROLL]))
            .unwrap();
        assert!(tracker.permissions_for(&id).unwrap().contains(PERMISSION_PAYROLL));
    }

    #[test]
    fn test_round_trip_through_storage() {
        let storage = memory_storage();
        let mut tracker = Tracker::new();
        let id = tracker.create_employee(alice()).unwrap();
        tracker.save_to_storage(&storage).unwrap();

        let loaded = Tracker::load_from_storage(&storage).unwrap();
        let employee = loaded.get_employee(&id).unwrap();
        assert_eq!(employee.name, "Alice");
        assert_eq!(employee.role, "HR Manager");
        assert_eq!(employee.start_date, NaiveDate::from_ymd_opt(2021, 4, 12).unwrap());
        assert_eq!(employee.salary, 52000);
        assert_eq!(employee.address, "10 King Street, London");
        assert_eq!(employee, tracker.get_employee(&id).unwrap());
        assert!(loaded.user(&id).unwrap().verify("password"));
    }

    #[test]
    fn test_update_changes_only_given_fields() {
        let mut tracker = Tracker::new();
        let id = tracker.create_employee(alice()).unwrap();
        let before = tracker.get_employee(&id).unwrap().clone();

        tracker
            .update_employee(&id, vec![EmployeeField::parse("salary", "55000").unwrap()])
            .unwrap();

        let after = tracker.get_employee(&id).unwrap();
        assert_eq!(after.salary, 55000);
        assert_eq!(after.name, before.name);
        assert_eq!(after.role, before.role);
        assert_eq!(after.address, before.address);
        assert_eq!(after.start_date, before.start_date);
    }

    #[test]
    fn test_update_rejects_unknown_field_and_invalid_values() {
        let mut tracker = Tracker::new();
        let id = tracker.create_employee(alice()).unwrap();
        let before = tracker.get_employee(&id).unwrap().clone();

        assert!(EmployeeField::parse("nickname", "Al").is_err());

        let err = tracker
            .update_employee(
                &id,
                vec![EmployeeField::Salary(60000), EmployeeField::Name(" ".to_string())],
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(tracker.get_employee(&id).unwrap(), &before);
    }

    #[test]
    fn test_delete_distinguishes_missing_and_malformed() {
        let mut tracker = Tracker::new();
        assert!(matches!(
            tracker.delete_employee("emp_deadbeef"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            tracker.delete_employee("not_an_id"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_delete_employee_cleans_up_memberships_and_credential() {
        let mut tracker = Tracker::new();
        let head = tracker.create_employee(alice()).unwrap();
        let member = tracker.create_employee(bob()).unwrap();
        let dep = tracker.create_department(department(&head)).unwrap();
        tracker.add_employee_to_department(&dep, &member).unwrap();

        tracker.delete_employee(&member).unwrap();

        assert!(tracker.user(&member).is_none());
        assert!(!tracker.get_department(&dep).unwrap().has_member(&member));
    }

    #[test]
    fn test_cannot_delete_head_of_department() {
        let mut tracker = Tracker::new();
        let head = tracker.create_employee(alice()).unwrap();
        tracker.create_department(department(&head)).unwrap();

        assert!(matches!(
            tracker.delete_employee(&head),
            Err(AppError::Validation(_))
        ));
        assert!(tracker.get_employee(&head).is_ok());
    }

    #[test]
    fn test_department_references_must_exist() {
        let mut tracker = Tracker::new();
        assert!(matches!(
            tracker.create_department(department("emp_deadbeef")),
            Err(AppError::NotFound(_))
        ));

        let head = tracker.create_employee(alice()).unwrap();
        let mut new = department(&head);
        new.parent_department = Some("dep_deadbeef".to_string());
        assert!(matches!(
            tracker.create_department(new),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_membership_add_and_remove() {
        let mut tracker = Tracker::new();
        let head = tracker.create_employee(alice()).unwrap();
        let dep = tracker.create_department(department(&head)).unwrap();

        assert!(matches!(
            tracker.add_employee_to_department(&dep, &head),
            Err(AppError::Duplicate(_))
        ));
        assert!(matches!(
            tracker.add_employee_to_department(&dep, "emp_deadbeef"),
            Err(AppError::NotFound(_))
        ));

        tracker.remove_employee_from_department(&dep, &head).unwrap();
        assert!(matches!(
            tracker.remove_employee_from_department(&dep, &head),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_parent_department_cannot_be_deleted() {
        let mut tracker = Tracker::new();
        let head = tracker.create_employee(alice()).unwrap();
        let parent = tracker.create_department(department(&head)).unwrap();
        let mut child = department(&head);
        child.parent_department = Some(parent.clone());
        let child = tracker.create_department(child).unwrap();

        assert!(matches!(
            tracker.delete_department(&parent),
            Err(AppError::Validation(_))
        ));
        tracker.delete_department(&child).unwrap();
        tracker.delete_department(&parent).unwrap();
        assert_eq!(tracker.department_count(), 0);
    }

    #[test]
    fn test_cycles_are_reported_not_prevented() {
        let mut tracker = Tracker::new();
        let head = tracker.create_employee(alice()).unwrap();
        let a = tracker.create_department(department(&head)).unwrap();
        let mut new_b = department(&head);
        new_b.parent_department = Some(a.clone());
        let b = tracker.create_department(new_b).unwrap();

        assert_eq!(tracker.find_department_cycle(&b).unwrap(), None);

        tracker
            .update_department(&a, vec![DepartmentField::ParentDepartment(Some(b.clone()))])
            .unwrap();

        let cycle = tracker.find_department_cycle(&a).unwrap().unwrap();
        assert_eq!(cycle, vec![a.clone(), b.clone(), a.clone()]);
        assert_eq!(tracker.department_cycles().len(), 1);
    }

    #[test]
    fn test_update_department_rejects_unknown_head() {
        let mut tracker = Tracker::new();
        let head = tracker.create_employee(alice()).unwrap();
        let dep = tracker.create_department(department(&head)).unwrap();

        let err = tracker
            .update_department(
                &dep,
                vec![DepartmentField::HeadOfDepartment("emp_deadbeef".to_string())],
            )
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(tracker.get_department(&dep).unwrap().head_of_department, head);
    }

    #[test]
    fn test_permission_lifecycle() {
        let mut tracker = Tracker::new();
        tracker.create_permission(PERMISSION_PAYROLL).unwrap();
        assert!(matches!(
            tracker.create_permission(PERMISSION_PAYROLL),
            Err(AppError::Duplicate(_))
        ));

        let id = tracker.create_employee(alice()).unwrap();
        tracker.grant_permission(&id, PERMISSION_PAYROLL).unwrap();
        assert!(matches!(
            tracker.grant_permission(&id, PERMISSION_PAYROLL),
            Err(AppError::Duplicate(_))
        ));

        tracker.set_permission_active(PERMISSION_PAYROLL, false).unwrap();
        assert!(tracker.permissions_for(&id).unwrap().is_empty());
        tracker.set_permission_active(PERMISSION_PAYROLL, true).unwrap();
        assert!(!tracker.permissions_for(&id).unwrap().is_empty());

        let revoked = tracker.delete_permission(PERMISSION_PAYROLL).unwrap();
        assert_eq!(revoked, vec![id.clone()]);
        assert!(!tracker.get_employee(&id).unwrap().has_permission(PERMISSION_PAYROLL));
    }

    #[test]
    fn test_set_password_updates_credential() {
        let mut tracker = Tracker::new();
        let id = tracker.create_employee(alice()).unwrap();

        tracker.set_password(&id, "s3cret").unwrap();
        assert!(tracker.user(&id).unwrap().verify("s3cret"));
        assert!(!tracker.user(&id).unwrap().verify("password"));
        assert!(matches!(
            tracker.set_password(&id, ""),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_bump_and_toggle() {
        let mut tracker = Tracker::new();
        let id = tracker.create_employee(alice()).unwrap();

        assert_eq!(tracker.bump_salary(&id, 10.0).unwrap(), 57200);
        assert!(!tracker.toggle_employee_enabled(&id).unwrap());
        assert!(tracker.toggle_employee_enabled(&id).unwrap());
    }

    #[test]
    fn test_list_employees_filters() {
        let mut tracker = Tracker::new();
        tracker.create_employee(alice()).unwrap();
        tracker.create_employee(bob()).unwrap();

        let rich = tracker
            .list_employees(&[Predicate::parse("min", "salary", "50000").unwrap()])
            .unwrap();
        assert_eq!(rich.len(), 1);
        assert_eq!(rich[0].name, "Alice");
        assert_eq!(tracker.list_employees(&[]).unwrap().len(), 2);
    }

    #[test]
    fn test_integrity_issues_report_credential_mismatch() {
        let mut tracker = Tracker::new();
        let id = tracker.create_employee(alice()).unwrap();
        assert!(tracker.integrity_issues().is_empty());

        tracker
            .users
            .get_mut(&id)
            .unwrap()
            .set_password_hash(PasswordHash::new("other").unwrap());

        let issues = tracker.integrity_issues();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("password hash differs"));
        assert!(issues[0].contains(&id));
    }

    #[test]
    fn test_integrity_issues_report_dangling_references() {
        let mut tracker = Tracker::new();
        let head = tracker.create_employee(alice()).unwrap();
        tracker.create_department(department(&head)).unwrap();
        tracker.users.remove(&head);
        tracker.employees.remove(&head);

        let issues = tracker.integrity_issues();
        assert!(issues.iter().any(|i| i.contains("unknown head")));
        assert!(issues.iter().any(|i| i.contains("unknown member")));
    }

    #[test]
    fn test_load_propagates_missing_file() {
        let storage = memory_storage();
        let err = Tracker::load_from_storage(&storage).unwrap_err();
        assert!(err.is_missing_file());
    }
}
