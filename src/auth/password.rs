// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing (Argon2id, PHC string format).

use std::sync::LazyLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError(e.to_string()))
}

/// Check a password against a stored PHC string.
///
/// An unparseable stored hash never verifies.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
            false
        }
    }
}

/// Valid hash that no login is expected to match, checked when the email is
/// unknown so both rejections cost one Argon2 verification.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("decoy-password-never-issued").ok());

/// Check a password against the stored hash of a user, or against a decoy
/// hash when there is no such user. `None` never verifies.
pub fn verify_password_or_decoy(stored_hash: Option<&str>, password: &str) -> bool {
    match stored_hash {
        Some(hash) => verify_password(hash, password),
        None => {
            if let Some(decoy) = DECOY_HASH.as_deref() {
                verify_password(decoy, password);
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_plaintext_and_verifies() {
        let hash = hash_password("secret1").unwrap();
        assert!(!hash.contains("secret1"));
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "secret1"));
        assert!(!verify_password(&hash, "secret2"));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn decoy_is_a_real_hash() {
        let decoy = DECOY_HASH.as_deref().expect("decoy hash is built");
        assert!(PasswordHash::new(decoy).is_ok());
        assert!(!verify_password(decoy, "secret1"));
    }

    #[test]
    fn missing_user_never_verifies() {
        assert!(!verify_password_or_decoy(None, "secret1"));
        assert!(!verify_password_or_decoy(None, "decoy-password-never-issued"));

        let hash = hash_password("secret1").unwrap();
        assert!(verify_password_or_decoy(Some(&hash), "secret1"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }
}
