//! Argon2 password hashing and verification.

use anyhow::{Context, Result, anyhow};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use rand::{RngCore, rngs::OsRng};

/// Hash a plaintext password into a PHC string with a fresh random salt.
///
/// # Errors
/// Returns an error if salt generation or hashing fails.
pub(crate) fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .context("failed to generate password salt")?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|err| anyhow!(err.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!(err.to_string()))?
        .to_string();
    Ok(phc)
}

/// Verify a plaintext password against a stored PHC string.
/// Unparseable hashes count as a failed verification, not an error.
pub(crate) fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("correct horse").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct horse").expect("hashing should succeed");
        assert!(!verify_password(&hash, "battery staple"));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same password").expect("hashing should succeed");
        let second = hash_password("same password").expect("hashing should succeed");
        assert_ne!(first, second);
    }
}
