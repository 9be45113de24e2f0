//! Password hashing and comparison.
//!
//! New hashes use the configured algorithm; stored hashes are compared by
//! their own prefix so accounts keep working after the algorithm changes.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{PasswordAlgorithm, PasswordConfig};

const DUMMY_PASSWORD: &str = "gatehouse-timing-equaliser";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credentials do not match")]
    Mismatch,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Argon2id instance with the given work factor.
pub fn password_hasher(memory_kib: u32, iterations: u32) -> Result<Argon2<'static>, CredentialError> {
    const PARALLELISM: u32 = 1;
    let params = Params::new(memory_kib, iterations, PARALLELISM, Some(32))
        .map_err(|e| CredentialError::Hashing(format!("invalid Argon2 parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes new passwords and compares plaintext against stored hashes.
#[derive(Clone)]
pub struct CredentialVerifier {
    algorithm: PasswordAlgorithm,
    bcrypt_cost: u32,
    argon2: Arc<Argon2<'static>>,
    dummy_hash: Arc<str>,
}

impl CredentialVerifier {
    pub fn new(config: &PasswordConfig) -> Result<Self, CredentialError> {
        let argon2 = password_hasher(config.argon2_memory_kib, config.argon2_iterations)?;
        let mut verifier = Self {
            algorithm: config.algorithm,
            bcrypt_cost: config.bcrypt_cost,
            argon2: Arc::new(argon2),
            dummy_hash: Arc::from(""),
        };
        verifier.dummy_hash = Arc::from(verifier.hash(DUMMY_PASSWORD)?);
        Ok(verifier)
    }

    /// Produce a salted one-way hash; two calls on the same input differ.
    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        match self.algorithm {
            PasswordAlgorithm::Bcrypt => bcrypt::hash(plaintext, self.bcrypt_cost)
                .map_err(|e| CredentialError::Hashing(e.to_string())),
            PasswordAlgorithm::Argon2id => {
                let salt = SaltString::generate(&mut OsRng);
                self.argon2
                    .hash_password(plaintext.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| CredentialError::Hashing(e.to_string()))
            }
        }
    }

    /// Succeeds only when `plaintext` produced `hashed`. Malformed hashes are a mismatch.
    pub fn compare(&self, hashed: &str, plaintext: &str) -> Result<(), CredentialError> {
        let matched = if hashed.starts_with("$argon2") {
            match PasswordHash::new(hashed) {
                Ok(parsed) => self.argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok(),
                Err(_) => false,
            }
        } else {
            bcrypt::verify(plaintext, hashed).unwrap_or(false)
        };

        if matched {
            Ok(())
        } else {
            Err(CredentialError::Mismatch)
        }
    }

    /// Spend the same work as a real comparison when there is no stored hash.
    pub fn compare_dummy(&self, plaintext: &str) {
        let _ = self.compare(&self.dummy_hash, plaintext);
    }

    pub fn algorithm(&self) -> PasswordAlgorithm {
        self.algorithm
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("algorithm", &self.algorithm)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}
