//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Identifiers
// =============================================================================

/// Prefix for employee identifiers
pub const EMPLOYEE_ID_PREFIX: &str = "emp";

/// Prefix for department identifiers
pub const DEPARTMENT_ID_PREFIX: &str = "dep";

/// Prefix for permission identifiers
pub const PERMISSION_ID_PREFIX: &str = "per";

/// Number of hex digits after the prefix separator
pub const ID_SUFFIX_LENGTH: usize = 8;

// =============================================================================
// Permissions
// =============================================================================

/// Read access to HR records (addresses)
pub const PERMISSION_HR_READ: &str = "hr_read";

/// Full HR write access
pub const PERMISSION_HR_WRITE: &str = "hr_write";

/// Payroll visibility (salaries)
pub const PERMISSION_PAYROLL: &str = "payroll";

/// Salary edit rights
pub const PERMISSION_FINANCE_EDIT: &str = "finance_edit";

/// IT administration
pub const PERMISSION_IT_ADMIN: &str = "it_admin";

/// Capability that satisfies every other capability check
pub const SUPERUSER_PERMISSION: &str = PERMISSION_HR_WRITE;

/// Permissions created by the sample data generator
pub const WELL_KNOWN_PERMISSIONS: &[&str] = &[
    PERMISSION_PAYROLL,
    PERMISSION_FINANCE_EDIT,
    PERMISSION_HR_READ,
    PERMISSION_HR_WRITE,
    PERMISSION_IT_ADMIN,
];

// =============================================================================
// Credentials
// =============================================================================

/// Random salt length in bytes
pub const SALT_LENGTH: usize = 16;

/// Derived key length in bytes
pub const KEY_LENGTH: usize = 32;

/// Decoded length of a stored password hash (salt || key)
pub const STORED_HASH_LENGTH: usize = SALT_LENGTH + KEY_LENGTH;

/// PBKDF2-HMAC-SHA256 iteration count.
/// Changing this invalidates every stored hash.
pub const PBKDF2_ITERATIONS: u32 = 200_000;

/// Minimum password length requirement (rejects empty passwords)
pub const MIN_PASSWORD_LENGTH: u64 = 1;

// =============================================================================
// Storage encoding
// =============================================================================

/// Separator for list-valued fields in a single cell
pub const LIST_SEPARATOR: &str = " ";
