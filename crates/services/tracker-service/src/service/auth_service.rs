//! Authentication service - Resolves login attempts to capabilities.
//!
//! Stateless: callers keep the returned permission set for their session.

use tracing::{info, warn};

use common::{AppError, AppResult};
use domain::{Caller, PermissionSet};

use super::Tracker;

/// Authentication trait for the presentation layer.
pub trait AuthService {
    /// Verify a login attempt and return the employee's capabilities.
    ///
    /// # Errors
    /// `UserNotFound` for an unknown identifier, `IncorrectPassword` when the
    /// password does not verify.
    fn login(&self, identifier: &str, password_attempt: &str) -> AppResult<PermissionSet>;

    /// Like [`AuthService::login`], bundling the identity with the result.
    fn authenticate(&self, identifier: &str, password_attempt: &str) -> AppResult<Caller> {
        let permissions = self.login(identifier, password_attempt)?;
        Ok(Caller::new(identifier, permissions))
    }
}

impl AuthService for Tracker {
    fn login(&self, identifier: &str, password_attempt: &str) -> AppResult<PermissionSet> {
        let user = self.user(identifier).ok_or_else(|| {
            warn!(id = %identifier, "Login failed: unknown user");
            AppError::UserNotFound(identifier.to_string())
        })?;

        if !user.verify(password_attempt) {
            warn!(id = %identifier, "Login failed: incorrect password");
            return Err(AppError::IncorrectPassword);
        }

        let permissions = self.permissions_for(identifier).map_err(|e| match e {
            AppError::NotFound(_) => AppError::CorruptData(format!(
                "credential {} has no employee record",
                identifier
            )),
            other => other,
        })?;

        info!(id = %identifier, permissions = %permissions, "Login succeeded");
        Ok(permissions)
    }
}
