//! Department command handlers.

use common::AppResult;
use domain::{DepartmentField, NewDepartment};

use super::{predicates, App};
use crate::cli::DepartmentCommands;

pub fn run(app: &mut App, action: &DepartmentCommands) -> AppResult<()> {
    match action {
        DepartmentCommands::List { filters } => {
            let predicates = predicates(filters)?;
            let departments = app.tracker.list_departments(&predicates)?;
            app.out.departments(&departments);
        }
        DepartmentCommands::Create {
            name,
            description,
            head,
            parent,
            members,
        } => {
            app.manager("create departments")?;
            let id = app.tracker.create_department(NewDepartment {
                name: name.trim().to_string(),
                description: description.trim().to_string(),
                head_of_department: head.clone(),
                parent_department: parent.clone(),
                members: members.clone(),
            })?;
            app.save()?;
            app.out.created("department", &id);
        }
        DepartmentCommands::Update { id, fields } => {
            app.manager("update departments")?;
            let fields = fields
                .iter()
                .map(|(field, value)| DepartmentField::parse(field, value))
                .collect::<Result<Vec<_>, _>>()?;
            app.tracker.update_department(id, fields)?;
            app.save()?;
            app.out.done(&format!("Updated {}", id));
        }
        DepartmentCommands::Delete { id } => {
            app.manager("delete departments")?;
            let department = app.tracker.delete_department(id)?;
            app.save()?;
            app.out.done(&format!("Deleted {} ({})", id, department.name));
        }
        DepartmentCommands::AddMember {
            department,
            employee,
        } => {
            app.manager("change department members")?;
            app.tracker.add_employee_to_department(department, employee)?;
            app.save()?;
            app.out.done(&format!("Added {} to {}", employee, department));
        }
        DepartmentCommands::RemoveMember {
            department,
            employee,
        } => {
            app.manager("change department members")?;
            app.tracker
                .remove_employee_from_department(department, employee)?;
            app.save()?;
            app.out.done(&format!("Removed {} from {}", employee, department));
        }
        DepartmentCommands::CheckCycles => {
            let cycles = app.tracker.department_cycles();
            app.out.cycles(&cycles);
        }
    }
    Ok(())
}
