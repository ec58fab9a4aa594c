//! Configuration manager for user accounts.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_LOG_LEVEL: &str = "info";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid `config.yaml`: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("missing `{0}` entry on `config.yaml` file")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Public base URL of uploaded media, e.g. profile images.
    pub media_url: Option<String>,
    /// Directory uploaded media are written to.
    pub media_root: PathBuf,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
    #[serde(skip)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to Argon2 configuration.
    #[serde(skip_serializing)]
    pub argon2: Option<Argon2>,
    /// Superuser created on start when missing.
    #[serde(skip_serializing)]
    pub superuser: Option<Superuser>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: String::default(),
            media_url: None,
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            postgres: None,
            argon2: None,
            superuser: None,
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Argon2 {
    /// Memory used while hashing.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
    /// Output hash length.
    pub hash_length: usize,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
            hash_length: 32,
        }
    }
}

/// Bootstrap superuser.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Superuser {
    pub username: String,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Version of the running crate.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.to_string())
    }

    /// Parse a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Configuration = serde_yaml::from_str(content)?;
        config.finish()
    }

    fn finish(mut self) -> Result<Self, ConfigError> {
        self.version = VERSION.to_owned();
        self.media_url = self
            .media_url
            .map(|u| Self::normalize_url(&u))
            .transpose()?;
        Ok(self)
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, ConfigError> {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(&file_path) {
            Ok(file) => {
                let config: Configuration = match serde_yaml::from_reader(file)
                {
                    Ok(config) => config,
                    Err(err) => {
                        return Ok(Arc::new(self.error(err)));
                    },
                };

                Ok(Arc::new(config.path(file_path).finish()?))
            },
            Err(err) => Ok(Arc::new(self.error(err))),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
name: Science Directory
media_url: media.example.org/files/
postgres:
  address: localhost:5432
  pool_size: 4
argon2:
  memory_cost: 19456
  iterations: 2
  parallelism: 1
  hash_length: 32
superuser:
  username: admin
  email: admin@example.org
"#;
        let config = Configuration::from_yaml(yaml).unwrap();

        assert_eq!(config.name, "Science Directory");
        assert_eq!(
            config.media_url.as_deref(),
            Some("https://media.example.org/files/")
        );
        assert_eq!(config.media_root, PathBuf::from(DEFAULT_MEDIA_ROOT));
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.version(), VERSION);
        assert_eq!(config.postgres.unwrap().pool_size, Some(4));
        assert_eq!(config.argon2.unwrap().memory_cost, 19456);

        let superuser = config.superuser.unwrap();
        assert_eq!(superuser.username, "admin");
        assert_eq!(superuser.password, None);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Configuration::default()
            .path(PathBuf::from("/nonexistent/config.yaml"))
            .read()
            .unwrap();

        assert!(config.postgres.is_none());
        assert_eq!(config.version(), VERSION);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Configuration::from_yaml("name: [unterminated"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
