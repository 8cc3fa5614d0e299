//! Salted one-way password hashing with Argon2id.
//!
//! Hashing is deliberately expensive, so the async entry points move the work
//! onto the blocking thread pool.

use std::fmt;
use std::sync::Arc;

use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};

use crate::config::HashingCost;
use crate::types::HashedPassword;

const SALT_LEN: usize = 16;

/// Errors from hashing or verification.
#[derive(Debug, Clone)]
pub enum PasswordError {
    /// The system random source failed.
    Entropy(String),
    /// The stored hash is not a valid PHC string.
    MalformedHash(String),
    /// Argon2 rejected the input or parameters.
    Hashing(String),
    /// The blocking task panicked or was cancelled.
    Task(String),
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entropy(msg) => write!(f, "Entropy source failed: {}", msg),
            Self::MalformedHash(msg) => write!(f, "Malformed password hash: {}", msg),
            Self::Hashing(msg) => write!(f, "Password hashing failed: {}", msg),
            Self::Task(msg) => write!(f, "Hashing task failed: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Argon2id hasher with configurable cost.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash verified against when a login does not exist, so both branches
    /// pay the same cost.
    dummy_hash: Arc<HashedPassword>,
}

impl PasswordHasher {
    pub fn new(cost: HashingCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;
        let dummy_hash = hash_with(&params, "directory-auth-dummy-password")?;
        Ok(Self {
            params,
            dummy_hash: Arc::new(dummy_hash),
        })
    }

    /// Hash a plaintext password with a fresh random salt.
    pub async fn hash(&self, plaintext: &str) -> Result<HashedPassword, PasswordError> {
        let params = self.params.clone();
        let plaintext = plaintext.to_string();
        tokio::task::spawn_blocking(move || hash_with(&params, &plaintext))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; errors only if the stored hash is
    /// structurally invalid.
    pub async fn verify(
        &self,
        hash: &HashedPassword,
        plaintext: &str,
    ) -> Result<bool, PasswordError> {
        let hash = hash.clone();
        let plaintext = plaintext.to_string();
        tokio::task::spawn_blocking(move || verify_blocking(&hash, &plaintext))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    /// Spend the same work as a real verification; the result is discarded.
    pub async fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(&self.dummy_hash, plaintext).await;
    }
}

fn hash_with(params: &Params, plaintext: &str) -> Result<HashedPassword, PasswordError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Entropy(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Hashing(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone());
    let phc = argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
        .to_string();

    Ok(HashedPassword::new(phc))
}

fn verify_blocking(hash: &HashedPassword, plaintext: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(hash.as_str()).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    // Parameters come from the PHC string itself.
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashingCost::minimal()).unwrap()
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hasher = hasher();
        let hash = hasher.hash("p@ss").await.unwrap();

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify(&hash, "p@ss").await.unwrap());
        assert!(!hasher.verify(&hash, "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let hasher = hasher();
        let first = hasher.hash("same").await.unwrap();
        let second = hasher.hash("same").await.unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(&first, "same").await.unwrap());
        assert!(hasher.verify(&second, "same").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_distinct_error() {
        let hasher = hasher();
        let result = hasher
            .verify(&HashedPassword::new("moderator"), "moderator")
            .await;

        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }

    #[tokio::test]
    async fn test_verify_uses_params_from_stored_hash() {
        let cheap = hasher();
        let hash = cheap.hash("secret").await.unwrap();

        let default_cost = PasswordHasher::new(HashingCost::default()).unwrap();
        assert!(default_cost.verify(&hash, "secret").await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_dummy_does_not_panic() {
        hasher().verify_dummy("anything").await;
    }

    #[test]
    fn test_invalid_cost_is_rejected() {
        let result = PasswordHasher::new(HashingCost {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        });
        assert!(matches!(result, Err(PasswordError::Hashing(_))));
    }
}
