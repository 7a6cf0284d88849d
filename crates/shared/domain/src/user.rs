//! Login credential record shadowing an employee.

use serde::{Deserialize, Serialize};

use crate::constants::EMPLOYEE_ID_PREFIX;
use crate::error::{DomainError, DomainResult};
use crate::ids::check_id;
use crate::password::PasswordHash;

/// User credential entity. The id equals the owning employee's id and
/// cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: String,
    password_hash: PasswordHash,
}

impl User {
    pub fn new(id: impl Into<String>, password_hash: PasswordHash) -> DomainResult<Self> {
        let id = id.into();
        if !check_id(&id, EMPLOYEE_ID_PREFIX) {
            return Err(DomainError::validation("not a valid employee id"));
        }
        Ok(Self { id, password_hash })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn set_password_hash(&mut self, password_hash: PasswordHash) {
        self.password_hash = password_hash;
    }

    /// Verify a login attempt against the stored credential
    pub fn verify(&self, password_attempt: &str) -> bool {
        self.password_hash.verify(password_attempt)
    }
}

/// Storage row for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub password_hash: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            password_hash: user.password_hash.as_str().to_string(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> DomainResult<Self> {
        let password_hash = PasswordHash::parse(&row.password_hash)
            .map_err(|_| DomainError::corrupt(format!("user {} has an invalid password hash", row.id)))?;
        User::new(row.id, password_hash).map_err(|e| DomainError::corrupt(e.to_string()))
    }
}
