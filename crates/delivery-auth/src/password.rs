//! Password hashing with Argon2id.

use crate::AuthError;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier};
use rand::RngCore;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Password hasher configuration.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Salt length in bytes.
    pub salt_length: usize,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { salt_length: 16 }
    }
}

impl PasswordHasher {
    /// Hash a password.
    ///
    /// Returns a PHC string (`$argon2id$v=19$...`).
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = self.generate_salt()?;
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Verify a password against a PHC hash string.
    pub fn verify(&self, password: &str, hash_str: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash_str)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Validate password strength.
    pub fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }

    fn generate_salt(&self) -> Result<SaltString, AuthError> {
        let mut bytes = vec![0u8; self.salt_length];
        rand::thread_rng().fill_bytes(&mut bytes);
        Ok(SaltString::encode_b64(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::default();
        let hash = hasher.hash("segredo123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("segredo123", &hash).unwrap());
        assert!(!hasher.verify("errada", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = PasswordHasher::default();
        assert_ne!(hasher.hash("same-pass").unwrap(), hasher.hash("same-pass").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(PasswordHasher::default().verify("x", "not-a-hash").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(PasswordHasher::validate_password("12345").is_err());
        assert!(PasswordHasher::validate_password("123456").is_ok());
    }
}
