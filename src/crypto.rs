//! Cryptogragic logics.

use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Argon2, Params, Version};
use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::OsRng;

use crate::config::Argon2 as ArgonConfig;
use crate::user::PasswordHash;

/// Marks a stored password that can never be verified.
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";
const UNUSABLE_PASSWORD_SUFFIX_LENGTH: usize = 40;

type Result<T> = std::result::Result<T, CryptoError>;

#[derive(thiserror::Error, Debug)]
pub enum CryptoError {
    #[error("argon2 error: {0}")]
    Argon2(String),
}

/// One-way password hashing and verification.
pub trait CredentialHasher: Send + Sync {
    /// Hash `password`, or produce the unusable sentinel when it is `None`.
    fn hash(&self, password: Option<&str>) -> Result<PasswordHash>;

    /// Check `password` against a stored hash.
    ///
    /// Always `false` for unusable hashes.
    fn verify(&self, password: &str, hash: &PasswordHash) -> bool;
}

/// Password manager that uses Argon2id and PHC string format for hashing and
/// verification.
pub struct PasswordManager {
    params: Params,
}

impl PasswordManager {
    /// Create a new [`PasswordManager`].
    pub fn new(config: Option<ArgonConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let params = Params::new(
            config.memory_cost,
            config.iterations,
            config.parallelism,
            Some(config.hash_length),
        )
        .map_err(|err| CryptoError::Argon2(err.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
    }

    /// Hash password using Argon2id.
    pub fn hash_password(&self, password: impl AsRef<[u8]>) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_ref(), &salt)
            .map_err(|e| CryptoError::Argon2(e.to_string()))?;

        Ok(hash.to_string())
    }
}

/// Sentinel stored in place of a hash when no password was given.
pub fn unusable_password() -> PasswordHash {
    let suffix =
        Alphanumeric.sample_string(&mut OsRng, UNUSABLE_PASSWORD_SUFFIX_LENGTH);
    PasswordHash::new(format!("{UNUSABLE_PASSWORD_PREFIX}{suffix}"))
}

impl CredentialHasher for PasswordManager {
    fn hash(&self, password: Option<&str>) -> Result<PasswordHash> {
        match password {
            Some(password) => Ok(PasswordHash::new(self.hash_password(password)?)),
            None => Ok(unusable_password()),
        }
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        if !hash.is_usable() {
            return false;
        }

        let Ok(parsed) = PhcString::new(hash.as_str()) else {
            tracing::warn!("stored password is not a PHC string");
            return false;
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
