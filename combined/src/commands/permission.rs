//! Permission command handlers.

use common::AppResult;

use super::{predicates, App};
use crate::cli::PermissionCommands;

pub fn run(app: &mut App, action: &PermissionCommands) -> AppResult<()> {
    match action {
        PermissionCommands::List { filters } => {
            let predicates = predicates(filters)?;
            let permissions = app.tracker.list_permissions(&predicates)?;
            app.out.permissions(&permissions);
        }
        PermissionCommands::Create { name } => {
            app.manager("create permissions")?;
            app.tracker.create_permission(name)?;
            app.save()?;
            app.out.created("permission", name);
        }
        PermissionCommands::Delete { name } => {
            app.manager("delete permissions")?;
            let revoked = app.tracker.delete_permission(name)?;
            app.save()?;
            app.out
                .done(&format!("Deleted {} (revoked from {} employees)", name, revoked.len()));
        }
        PermissionCommands::Activate { name } => set_active(app, name, true)?,
        PermissionCommands::Deactivate { name } => set_active(app, name, false)?,
    }
    Ok(())
}

fn set_active(app: &mut App, name: &str, active: bool) -> AppResult<()> {
    app.manager("change permissions")?;
    app.tracker.set_permission_active(name, active)?;
    app.save()?;
    let state = if active { "active" } else { "inactive" };
    app.out.done(&format!("{} is now {}", name, state));
    Ok(())
}
