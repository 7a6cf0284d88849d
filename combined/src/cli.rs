//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "employee-tracker")]
#[command(about = "HR records: employees, departments and permissions")]
pub struct Cli {
    /// Directory holding the CSV files
    #[arg(long, global = true, env = "TRACKER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Employee id to act as
    #[arg(long = "as", global = true, value_name = "EMP_ID")]
    pub caller: Option<String>,

    /// Password of the acting employee
    #[arg(long, global = true, env = "TRACKER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load stored data, seeding sample data on first run
    Init {
        /// Discard stored data and seed again
        #[arg(long)]
        force: bool,
    },
    /// Check credentials and show the caller's permissions
    Login,
    /// Employee records
    Employee {
        #[command(subcommand)]
        action: EmployeeCommands,
    },
    /// Departments and memberships
    Department {
        #[command(subcommand)]
        action: DepartmentCommands,
    },
    /// Permission registry
    Permission {
        #[command(subcommand)]
        action: PermissionCommands,
    },
}

/// Repeatable `FIELD=VALUE` filters
#[derive(Args, Default)]
pub struct FilterArgs {
    /// Substring match on a text field
    #[arg(long, value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub contains: Vec<(String, String)>,

    /// Inclusive lower bound on a number or date field
    #[arg(long, value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub min: Vec<(String, String)>,

    /// Inclusive upper bound on a number or date field
    #[arg(long, value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub max: Vec<(String, String)>,
}

#[derive(Subcommand)]
pub enum EmployeeCommands {
    /// List employees
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show the fields of one employee visible to the caller
    Show { id: String },
    /// Create an employee
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start_date: String,
        #[arg(long)]
        salary: String,
        #[arg(long)]
        address: String,
        /// Initial password
        #[arg(long = "employee-password")]
        employee_password: String,
        /// Permission to grant (repeatable)
        #[arg(long = "permission")]
        permissions: Vec<String>,
    },
    /// Update fields of an employee
    Update {
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment, required = true)]
        fields: Vec<(String, String)>,
    },
    /// Delete an employee
    Delete { id: String },
    /// Change an employee's password
    Passwd {
        id: String,
        #[arg(long)]
        new_password: String,
    },
    /// Raise salary by a percentage
    Bump {
        id: String,
        #[arg(allow_negative_numbers = true)]
        percent: f64,
    },
    /// Enable or disable an employee
    Toggle { id: String },
    /// Grant a permission
    Grant { id: String, permission: String },
    /// Revoke a permission
    Revoke { id: String, permission: String },
}

#[derive(Subcommand)]
pub enum DepartmentCommands {
    /// List departments
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Create a department
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// Employee id of the head
        #[arg(long)]
        head: String,
        /// Parent department id
        #[arg(long)]
        parent: Option<String>,
        /// Member employee id (repeatable)
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Update fields of a department
    Update {
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment, required = true)]
        fields: Vec<(String, String)>,
    },
    /// Delete a department
    Delete { id: String },
    /// Add an employee to a department
    AddMember { department: String, employee: String },
    /// Remove an employee from a department
    RemoveMember { department: String, employee: String },
    /// Report parent links that loop
    CheckCycles,
}

#[derive(Subcommand)]
pub enum PermissionCommands {
    /// List permissions
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Register a permission
    Create { name: String },
    /// Delete a permission and revoke it everywhere
    Delete { name: String },
    /// Mark a permission active
    Activate { name: String },
    /// Mark a permission inactive
    Deactivate { name: String },
}

/// Parse `FIELD=VALUE`. The value may be empty or contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(field, _)| !field.trim().is_empty())
        .map(|(field, value)| (field.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))
}
