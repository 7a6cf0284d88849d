//! Prefixed random identifiers (`emp_1a2b3c4d`).

use uuid::Uuid;

use crate::constants::ID_SUFFIX_LENGTH;
use crate::error::{DomainError, DomainResult};

/// Allocate a new identifier: `<prefix>_<8 hex digits>`.
///
/// Uniqueness is probabilistic only; callers that need it must check
/// their registry and redraw.
pub fn new_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &hex[..ID_SUFFIX_LENGTH])
}

/// Check that `value` is `prefix`, an underscore, then exactly 8 hex digits.
pub fn check_id(value: &str, prefix: &str) -> bool {
    value
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .map(|suffix| {
            suffix.len() == ID_SUFFIX_LENGTH && suffix.chars().all(|c| c.is_ascii_hexdigit())
        })
        .unwrap_or(false)
}

/// Like [`check_id`], but returns a validation error naming the field.
pub fn require_id(value: &str, prefix: &str, field: &str) -> DomainResult<()> {
    if check_id(value, prefix) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "{} must be a valid {} id, got '{}'",
            field, prefix, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_uses_prefix_and_eight_hex_digits() {
        let id = new_id("emp");
        let (prefix, suffix) = id.split_once('_').unwrap();

        assert_eq!(prefix, "emp");
        assert_eq!(suffix.len(), 8);
        assert!(u32::from_str_radix(suffix, 16).is_ok());
    }

    #[test]
    fn test_generated_ids_pass_check() {
        for prefix in ["emp", "dep", "per", "idtest"] {
            assert!(check_id(&new_id(prefix), prefix));
        }
    }

    #[test]
    fn test_ids_differ() {
        let ids: std::collections::HashSet<_> = (0..4).map(|_| new_id("id")).collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_wrong_prefix_fails() {
        let id = new_id("test");
        assert!(!check_id(&id, "test2"));
        assert!(!check_id("dep_12345678", "emp"));
    }

    #[test]
    fn test_wrong_suffix_length_fails() {
        assert!(!check_id("emp_12345", "emp"));
        assert!(!check_id("emp_1234567888", "emp"));
        assert!(!check_id("emp_", "emp"));
    }

    #[test]
    fn test_non_hex_fails() {
        assert!(!check_id("emp_12Z45678", "emp"));
        assert!(!check_id("emp_+1234567", "emp"));
    }

    #[test]
    fn test_missing_separator_fails() {
        assert!(!check_id("emp12345678", "emp"));
        assert!(!check_id("not_an_id", "emp"));
    }

    #[test]
    fn test_require_id_names_field() {
        let err = require_id("bogus", "emp", "Head of department").unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("Head of department")));
    }
}
