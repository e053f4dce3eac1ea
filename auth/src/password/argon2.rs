use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as _;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// One-way password hashing (Argon2id).
///
/// Stateless and `Copy`; services keep one instance and move copies onto the
/// blocking pool for each hash, since the KDF is deliberately slow.
#[derive(Clone, Copy)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a new password hasher with the library's default parameters.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password for storage.
    ///
    /// A fresh random salt is generated per call, so hashing the same
    /// password twice yields different digests.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string carrying the algorithm, parameters, salt, and digest
    ///
    /// # Errors
    /// * `HashingFailed` - The underlying KDF reported a failure
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a plaintext password against a stored digest.
    ///
    /// A mismatch is `Ok(false)`; only a digest that cannot be parsed is an
    /// error.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `digest` - Stored digest in PHC string format
    ///
    /// # Errors
    /// * `VerificationFailed` - The stored digest is not a valid PHC string
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| PasswordError::VerificationFailed(format!("Invalid digest: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
