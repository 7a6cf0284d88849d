//! Employee command handlers.

use tracing::debug;

use common::{AppError, AppResult};
use domain::{
    can_change_password, resolve_field_access, visible_on_others, Caller, Employee,
    EmployeeAttribute, EmployeeField, NewEmployee, Predicate,
};

use super::{predicates, App};
use crate::cli::EmployeeCommands;

pub fn run(app: &mut App, action: &EmployeeCommands) -> AppResult<()> {
    match action {
        EmployeeCommands::List { filters } => {
            let caller = app.caller_or_anonymous()?;
            let predicates = predicates(filters)?;
            check_filter_visibility(&caller, &predicates)?;
            let employees = app.tracker.list_employees(&predicates)?;
            app.out.employees(&caller, &employees);
        }
        EmployeeCommands::Show { id } => {
            let caller = app.caller_or_anonymous()?;
            let employee = app.tracker.get_employee(id)?;
            app.out.employee(&caller, employee);
        }
        EmployeeCommands::Create {
            name,
            role,
            start_date,
            salary,
            address,
            employee_password,
            permissions,
        } => {
            app.manager("create employees")?;
            let new = NewEmployee::from_form(name, role, start_date, salary, address, employee_password)?
                .with_permissions(permissions.iter().cloned());
            let id = app.tracker.create_employee(new)?;
            app.save()?;
            app.out.created("employee", &id);
        }
        EmployeeCommands::Update { id, fields } => {
            let caller = app.caller()?;
            let fields = fields
                .iter()
                .map(|(field, value)| EmployeeField::parse(field, value))
                .collect::<Result<Vec<_>, _>>()?;
            check_update(&caller, app.tracker.get_employee(id)?, &fields)?;
            app.tracker.update_employee(id, fields)?;
            app.save()?;
            app.out.done(&format!("Updated {}", id));
        }
        EmployeeCommands::Delete { id } => {
            app.manager("delete employees")?;
            let employee = app.tracker.delete_employee(id)?;
            app.save()?;
            app.out.done(&format!("Deleted {} ({})", id, employee.name));
        }
        EmployeeCommands::Passwd { id, new_password } => {
            let caller = app.caller()?;
            app.tracker.get_employee(id)?;
            if !can_change_password(&caller, id) {
                return Err(AppError::forbidden(format!("change the password of {}", id)));
            }
            app.tracker.set_password(id, new_password)?;
            app.save()?;
            app.out.done(&format!("Password changed for {}", id));
        }
        EmployeeCommands::Bump { id, percent } => {
            let caller = app.caller()?;
            let access = resolve_field_access(&caller, app.tracker.get_employee(id)?);
            if !access.can_edit(EmployeeAttribute::Salary) {
                return Err(AppError::forbidden("edit salary"));
            }
            let salary = app.tracker.bump_salary(id, *percent)?;
            app.save()?;
            app.out.done(&format!("Salary of {} is now {}", id, salary));
        }
        EmployeeCommands::Toggle { id } => {
            app.manager("enable or disable employees")?;
            let enabled = app.tracker.toggle_employee_enabled(id)?;
            app.save()?;
            let state = if enabled { "enabled" } else { "disabled" };
            app.out.done(&format!("{} is now {}", id, state));
        }
        EmployeeCommands::Grant { id, permission } => {
            app.manager("grant permissions")?;
            app.tracker.grant_permission(id, permission)?;
            app.save()?;
            app.out.done(&format!("Granted {} to {}", permission, id));
        }
        EmployeeCommands::Revoke { id, permission } => {
            app.manager("revoke permissions")?;
            app.tracker.revoke_permission(id, permission)?;
            app.save()?;
            app.out.done(&format!("Revoked {} from {}", permission, id));
        }
    }
    Ok(())
}

/// Every requested field must be editable by the caller on `target`.
fn check_update(caller: &Caller, target: &Employee, fields: &[EmployeeField]) -> AppResult<()> {
    let access = resolve_field_access(caller, target);
    for field in fields {
        access.check_edit(caller, field)?;
    }
    Ok(())
}

/// Filtering on an attribute leaks it, so only attributes the caller can
/// see on other employees' records may be filtered on.
fn check_filter_visibility(caller: &Caller, predicates: &[Predicate]) -> AppResult<()> {
    let visible = visible_on_others(&caller.permissions);
    for predicate in predicates {
        let field = predicate.field();
        let hidden = EmployeeAttribute::from_name(field).is_some_and(|a| !visible.contains(&a));
        if hidden {
            debug!(field = %field, "Rejected filter on hidden attribute");
            return Err(AppError::forbidden(format!("filter on {}", field)));
        }
    }
    Ok(())
}
