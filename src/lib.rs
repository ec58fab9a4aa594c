//! User profiles and account management for the science directory.
//!
//! A [`user::User`] is a username/password identity carrying personal,
//! contact, affiliation and publication details. Accounts are created through
//! [`user::UserManager`] only.

#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod telemetry;
pub mod user;

use std::sync::Arc;

use config::{ConfigError, Configuration};
use error::Result;

/// Services shared by every caller.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Configuration>,
    pub db: database::Database,
    pub users: user::UserManager,
    pub storage: Arc<user::LocalFileStorage>,
}

/// Initialize the application state.
pub async fn initialize_state(config: Arc<Configuration>) -> Result<AppState> {
    let Some(postgres) = &config.postgres else {
        tracing::error!("missing `postgres` entry on `config.yaml` file");
        return Err(ConfigError::Missing("postgres").into());
    };
    let db = database::Database::from_config(postgres).await?;

    // execute migrations scripts on start.
    db.migrate().await?;

    let hasher = Arc::new(crypto::PasswordManager::new(config.argon2.clone())?);
    let users = user::UserManager::new(
        Arc::new(user::PgUserRepository::new(db.postgres.clone())),
        hasher,
        Arc::new(clock::SystemClock),
    );
    let storage = Arc::new(user::LocalFileStorage::new(&config.media_root));

    Ok(AppState {
        config,
        db,
        users,
        storage,
    })
}
