//! Error handler for user accounts.

use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the account layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error("username '{username}' is already taken")]
    UsernameTaken { username: String },

    #[error("no user with username '{username}'")]
    NotFound { username: String },

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("SQL request failed: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Crypto(#[from] crate::crypto::CryptoError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("file storage failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Names of the fields that failed validation, if any.
    pub fn invalid_fields(&self) -> Vec<String> {
        match self {
            Error::Validation(errors) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .keys()
                    .map(|field| field.to_string())
                    .collect();
                fields.sort();
                fields
            },
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use validator::ValidationError;

    #[test]
    fn test_invalid_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("username", ValidationError::new("invalid"));
        let err = Error::from(errors);

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.invalid_fields(), vec!["username".to_string()]);
        assert!(Error::InvalidCredentials.invalid_fields().is_empty());
    }
}
