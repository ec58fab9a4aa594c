//! Identity and credential capability of a [`User`](super::User).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::UNUSABLE_PASSWORD_PREFIX;

/// A hashed password, or the unusable sentinel.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an already hashed value.
    ///
    /// Never hashes. Caller must ensure the value comes from a
    /// [`CredentialHasher`](crate::crypto::CredentialHasher) or the store.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the same string as a string slice `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a password could ever match this hash.
    ///
    /// An empty hash, as left on records that never went through a hasher,
    /// is unusable.
    pub fn is_usable(&self) -> bool {
        !self.0.is_empty() && !self.0.starts_with(UNUSABLE_PASSWORD_PREFIX)
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHash")
            .field("phc_string", &"[REDACTED]")
            .finish()
    }
}

/// Password and login bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(skip)]
    pub password: PasswordHash,
    pub last_login: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Whether the account can log in with a password at all.
    pub fn has_usable_password(&self) -> bool {
        self.password.is_usable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let hash = PasswordHash::new("$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA");

        assert!(!format!("{hash:?}").contains("argon2id"));
    }

    #[test]
    fn test_usable() {
        assert!(PasswordHash::new("$argon2id$v=19$...").is_usable());
        assert!(!PasswordHash::new("!abcdef").is_usable());
        assert!(!PasswordHash::default().is_usable());

        let credentials = Credentials {
            password: PasswordHash::new("!abcdef"),
            last_login: None,
        };
        assert!(!credentials.has_usable_password());
    }

    #[test]
    fn test_password_never_serialized() {
        let credentials = Credentials {
            password: PasswordHash::new("$argon2id$secret"),
            last_login: None,
        };
        let json = serde_json::to_string(&credentials).unwrap();

        assert!(!json.contains("secret"));
        assert!(json.contains("last_login"));
    }
}
