//! Argon2 password hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use hub_core::ports::{AuthError, PasswordService};

/// Argon2id with a fresh random salt per hash; hashes are stored in PHC string form.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = Argon2PasswordService::new();

        let hash = service.hash("secret1").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(service.verify("secret1", &hash).unwrap());
        assert!(!service.verify("secret2", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let service = Argon2PasswordService::new();

        assert_ne!(service.hash("secret1").unwrap(), service.hash("secret1").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let service = Argon2PasswordService::new();

        assert!(matches!(
            service.verify("secret1", "plaintext"),
            Err(AuthError::HashingError(_))
        ));
    }
}
