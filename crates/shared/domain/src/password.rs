//! Password hashing and verification.
//!
//! Stored format: `base64(salt[16] || pbkdf2_hmac_sha256(password, salt, 200_000)[32])`.
//! The format carries no version tag, so the KDF constants are fixed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::constants::{
    KEY_LENGTH, MIN_PASSWORD_LENGTH, PBKDF2_ITERATIONS, SALT_LENGTH, STORED_HASH_LENGTH,
};
use crate::error::{DomainError, DomainResult};

/// Hash a plaintext password with a fresh random salt.
///
/// Two calls with the same password give different encodings.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(password, &salt);

    let mut encoded = Vec::with_capacity(STORED_HASH_LENGTH);
    encoded.extend_from_slice(&salt);
    encoded.extend_from_slice(&key);
    BASE64.encode(encoded)
}

/// Verify a plaintext password against a stored hash.
///
/// Returns `false` for a mismatch and for a structurally invalid stored value.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Some(decoded) = decode_stored(stored_hash) else {
        return false;
    };
    let (salt, stored_key) = decoded.split_at(SALT_LENGTH);
    let key = derive_key(password, salt);
    key[..].ct_eq(stored_key).into()
}

/// Strict structural check for a hash coming from an untrusted source.
pub fn is_valid_stored_password_hash(value: &str) -> bool {
    decode_stored(value).is_some()
}

fn decode_stored(value: &str) -> Option<Vec<u8>> {
    if value.is_empty() {
        return None;
    }
    BASE64
        .decode(value)
        .ok()
        .filter(|bytes| bytes.len() == STORED_HASH_LENGTH)
}

#[inline]
fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Stored password hash value object.
///
/// Always holds a structurally valid encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHash")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl PasswordHash {
    /// Hash a new plaintext password.
    ///
    /// # Errors
    /// Returns a validation error if the password is empty.
    pub fn new(plain_text: &str) -> DomainResult<Self> {
        if (plain_text.chars().count() as u64) < MIN_PASSWORD_LENGTH {
            return Err(DomainError::validation("Password cannot be empty"));
        }
        Ok(Self {
            hash: hash_password(plain_text),
        })
    }

    /// Accept an already-encoded hash (loaded from a file).
    ///
    /// # Errors
    /// Returns a corrupt data error if the value is not a valid stored hash.
    pub fn parse(stored: &str) -> DomainResult<Self> {
        if !is_valid_stored_password_hash(stored) {
            return Err(DomainError::corrupt("not a valid password hash"));
        }
        Ok(Self {
            hash: stored.to_string(),
        })
    }

    /// Get the encoded hash for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        verify_password(plain_text, &self.hash)
    }
}

impl From<PasswordHash> for String {
    fn from(password: PasswordHash) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("SecurePassword123!");

        assert!(verify_password("SecurePassword123!", &stored));
        assert!(!verify_password("WrongPassword123", &stored));
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123";
        let first = hash_password(plain);
        let second = hash_password(plain);

        // Different salts produce different encodings
        assert_ne!(first, second);
        // But both verify correctly
        assert!(verify_password(plain, &first));
        assert!(verify_password(plain, &second));
    }

    #[test]
    fn test_empty_password_still_hashes() {
        // The hasher itself does not police content
        let stored = hash_password("");
        assert!(verify_password("", &stored));
        assert!(!verify_password(" ", &stored));
    }

    #[test]
    fn test_hash_is_valid_stored_hash() {
        let stored = hash_password("password");
        assert!(is_valid_stored_password_hash(&stored));
        assert_eq!(BASE64.decode(&stored).unwrap().len(), 48);
    }

    #[test]
    fn test_invalid_stored_hashes_rejected() {
        assert!(!is_valid_stored_password_hash(""));
        assert!(!is_valid_stored_password_hash("bad_hash"));
        assert!(!is_valid_stored_password_hash("not base64 at all!"));
        // Valid base64, wrong length
        assert!(!is_valid_stored_password_hash(&BASE64.encode([0u8; 47])));
        assert!(!is_valid_stored_password_hash(&BASE64.encode([0u8; 49])));
        // Missing padding
        let stored = hash_password("password");
        let unpadded = BASE64.encode([7u8; 47]);
        assert!(!is_valid_stored_password_hash(unpadded.trim_end_matches('=')));
        assert!(!is_valid_stored_password_hash(&format!("{}\n", stored)));
    }

    #[test]
    fn test_verify_rejects_malformed_stored_value() {
        assert!(!verify_password("password", "bad_hash"));
        assert!(!verify_password("password", ""));
    }

    #[test]
    fn test_value_object_round_trip() {
        let hash = PasswordHash::new("TestPassword123").unwrap();
        let restored = PasswordHash::parse(hash.as_str()).unwrap();

        assert_eq!(hash, restored);
        assert!(restored.verify("TestPassword123"));
    }

    #[test]
    fn test_value_object_rejects_empty_password() {
        assert!(matches!(
            PasswordHash::new(""),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_value_object_rejects_corrupt_hash() {
        assert!(matches!(
            PasswordHash::parse("bad_hash"),
            Err(DomainError::CorruptData(_))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let hash = PasswordHash::new("secret").unwrap();
        let debug = format!("{:?}", hash);

        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(hash.as_str()));
    }
}
