//! Terminal rendering. Text by default, JSON with `--json`.

use serde_json::{json, Map, Value};

use domain::{
    can_manage_records, resolve_field_access, Caller, Department, Employee, EmployeeAttribute,
    Permission,
};
use tracker_service_lib::config::TrackerServiceConfig;
use tracker_service_lib::infra::BootstrapOutcome;
use tracker_service_lib::service::Tracker;

pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn print_json(value: Value) {
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
    }

    pub fn init(&self, config: &TrackerServiceConfig, tracker: &Tracker, outcome: BootstrapOutcome) {
        if self.json {
            return Self::print_json(json!({
                "outcome": outcome.to_string(),
                "data_dir": config.data_dir.display().to_string(),
                "employees": tracker.employee_count(),
                "departments": tracker.department_count(),
                "permissions": tracker.permission_count(),
            }));
        }
        println!(
            "Data {} from {}: {} employees, {} departments, {} permissions",
            outcome,
            config.data_dir.display(),
            tracker.employee_count(),
            tracker.department_count(),
            tracker.permission_count()
        );
    }

    pub fn login(&self, caller: &Caller) {
        let id = caller.id.as_deref().unwrap_or_default();
        if self.json {
            return Self::print_json(json!({ "id": id, "permissions": caller.permissions }));
        }
        println!("Logged in as {}", id);
        if caller.permissions.is_empty() {
            println!("Permissions: (none)");
        } else {
            println!("Permissions: {}", caller.permissions);
        }
    }

    /// Only the attributes visible to the caller are included.
    fn employee_value(caller: &Caller, employee: &Employee) -> Value {
        let access = resolve_field_access(caller, employee);
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(employee.id()));
        for attribute in EmployeeAttribute::ALL {
            if !access.can_view(attribute) {
                continue;
            }
            let value = match attribute {
                EmployeeAttribute::Salary => json!(employee.salary),
                other => json!(other.value_of(employee)),
            };
            fields.insert(attribute.as_str().to_string(), value);
        }
        if caller.is(employee.id()) || can_manage_records(caller) {
            fields.insert("enabled".to_string(), json!(employee.enabled));
            fields.insert("permissions".to_string(), json!(employee.permissions));
        }
        fields.insert("editable".to_string(), json!(access.editable));
        Value::Object(fields)
    }

    pub fn employees(&self, caller: &Caller, employees: &[&Employee]) {
        if self.json {
            let rows: Vec<Value> = employees
                .iter()
                .map(|e| Self::employee_value(caller, e))
                .collect();
            return Self::print_json(Value::Array(rows));
        }
        for employee in employees {
            let access = resolve_field_access(caller, employee);
            let cells: Vec<String> = EmployeeAttribute::ALL
                .into_iter()
                .filter(|a| access.can_view(*a))
                .map(|a| a.value_of(employee))
                .collect();
            println!("{}  {}", employee.id(), cells.join(" | "));
        }
        println!("{} employee(s)", employees.len());
    }

    /// Editable attributes are marked with `*`.
    pub fn employee(&self, caller: &Caller, employee: &Employee) {
        if self.json {
            return Self::print_json(Self::employee_value(caller, employee));
        }
        let access = resolve_field_access(caller, employee);
        println!("{:<12} {}", "id", employee.id());
        for attribute in EmployeeAttribute::ALL {
            if access.can_view(attribute) {
                let marker = if access.can_edit(attribute) { " *" } else { "" };
                println!("{:<12} {}{}", attribute.as_str(), attribute.value_of(employee), marker);
            }
        }
        if caller.is(employee.id()) || can_manage_records(caller) {
            println!("{:<12} {}", "enabled", employee.enabled);
            println!("{:<12} {}", "permissions", employee.permissions.join(", "));
        }
    }

    pub fn departments(&self, departments: &[&Department]) {
        if self.json {
            let rows: Vec<Value> = departments
                .iter()
                .map(|d| {
                    json!({
                        "id": d.id(),
                        "name": d.name,
                        "description": d.description,
                        "head_of_department": d.head_of_department,
                        "parent_department": d.parent_department,
                        "members": d.members(),
                    })
                })
                .collect();
            return Self::print_json(Value::Array(rows));
        }
        for department in departments {
            println!("{}  {} - {}", department.id(), department.name, department.description);
            println!("    head:    {}", department.head_of_department);
            if let Some(parent) = &department.parent_department {
                println!("    parent:  {}", parent);
            }
            println!("    members: {}", department.members().join(", "));
        }
        println!("{} department(s)", departments.len());
    }

    pub fn permissions(&self, permissions: &[&Permission]) {
        if self.json {
            return Self::print_json(json!(permissions));
        }
        for permission in permissions {
            let state = if permission.active { "active" } else { "inactive" };
            println!("{:<16} {}", permission.name, state);
        }
    }

    pub fn cycles(&self, cycles: &[Vec<String>]) {
        if self.json {
            return Self::print_json(json!(cycles));
        }
        if cycles.is_empty() {
            println!("No department cycles");
        }
        for cycle in cycles {
            println!("Cycle: {}", cycle.join(" -> "));
        }
    }

    pub fn created(&self, kind: &str, id: &str) {
        if self.json {
            return Self::print_json(json!({ "created": kind, "id": id }));
        }
        println!("Created {} {}", kind, id);
    }

    pub fn done(&self, message: &str) {
        if self.json {
            return Self::print_json(json!({ "result": message }));
        }
        println!("{}", message);
    }
}
