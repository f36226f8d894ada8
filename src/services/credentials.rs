//! Password hashing and verification

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AppError, AppResult};

#[derive(Clone, Default)]
pub struct CredentialService {
    argon2: Argon2<'static>,
}

impl CredentialService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored hash
    pub fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let credentials = CredentialService::new();
        let hash = credentials.hash_password("password123").unwrap();

        assert_ne!(hash, "password123");
        assert!(hash.starts_with("$argon2"));
        assert!(credentials.verify_password("password123", &hash).unwrap());
        assert!(!credentials.verify_password("password124", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let credentials = CredentialService::new();
        let first = credentials.hash_password("password123").unwrap();
        let second = credentials.hash_password("password123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        let err = CredentialService::new()
            .verify_password("password123", "not-a-hash")
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
