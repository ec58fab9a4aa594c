//! Account factory and account-level operations.

use std::sync::Arc;

use validator::Validate;

use crate::clock::Clock;
use crate::config::Superuser;
use crate::crypto::CredentialHasher;
use crate::error::{Error, Result};
use crate::telemetry;
use crate::user::{ExtraFields, User, UserRepository};

/// Creates, finds and authenticates accounts.
///
/// New accounts only come out of this type, so every persisted record has a
/// hashed (or unusable) password and normalized flags.
#[derive(Clone)]
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
}

impl UserManager {
    /// Create a new [`UserManager`].
    pub fn new(
        repo: Arc<dyn UserRepository>,
        hasher: Arc<dyn CredentialHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repo, hasher, clock }
    }

    async fn create_with_flags(
        &self,
        username: &str,
        password: Option<&str>,
        is_staff: bool,
        is_superuser: bool,
        extra: ExtraFields,
    ) -> Result<User> {
        let now = self.clock.now();

        let mut user = User::new(username, now);
        user.is_staff = is_staff;
        user.is_active = true;
        user.permissions.is_superuser = is_superuser;
        user.credentials.last_login = Some(now);
        extra.apply(&mut user);

        user.validate()?;
        user.credentials.password = self.hasher.hash(password)?;

        self.repo.create(&user).await?;

        tracing::info!(username = %user.username, is_superuser, "user created");
        telemetry::record_user_created(is_superuser);

        Ok(user)
    }

    /// Create a staff account.
    ///
    /// `email` is used unless `extra` already carries one. Without a
    /// password the account gets an unusable one.
    pub async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password: Option<&str>,
        extra: ExtraFields,
    ) -> Result<User> {
        let extra = extra.email_or(email);
        self.create_with_flags(username, password, true, false, extra)
            .await
    }

    /// Create a staff account with every permission.
    pub async fn create_superuser(
        &self,
        username: &str,
        password: Option<&str>,
        extra: ExtraFields,
    ) -> Result<User> {
        self.create_with_flags(username, password, true, true, extra)
            .await
    }

    /// Create the configured superuser unless the username already exists.
    pub async fn ensure_superuser(&self, superuser: &Superuser) -> Result<User> {
        match self.get_by_natural_key(&superuser.username).await {
            Ok(user) => Ok(user),
            Err(Error::NotFound { .. }) => {
                let extra = ExtraFields {
                    email: superuser.email.clone(),
                    ..Default::default()
                };
                self.create_superuser(
                    &superuser.username,
                    superuser.password.as_deref(),
                    extra,
                )
                .await
            },
            Err(err) => Err(err),
        }
    }

    /// Find an account using its `username`.
    pub async fn get_by_natural_key(&self, username: &str) -> Result<User> {
        self.repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| Error::NotFound {
                username: username.to_owned(),
            })
    }

    /// Validate and persist profile changes.
    pub async fn update(&self, user: &User) -> Result<()> {
        user.validate()?;
        self.repo.update(user).await
    }

    /// Replace the password hash of `user`. The record is not persisted.
    pub fn set_password(
        &self,
        user: &mut User,
        password: Option<&str>,
    ) -> Result<()> {
        user.credentials.password = self.hasher.hash(password)?;
        Ok(())
    }

    /// Whether `password` matches the stored hash.
    pub fn check_password(&self, user: &User, password: &str) -> bool {
        self.hasher.verify(password, &user.credentials.password)
    }

    /// Verify credentials of an active account and stamp `last_login`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User> {
        let Some(mut user) = self.repo.find_by_username(username).await? else {
            // Unknown usernames cost one hash too.
            let _ = self.hasher.hash(Some(password));
            telemetry::record_authentication(false);
            return Err(Error::InvalidCredentials);
        };

        if !user.is_active || !self.check_password(&user, password) {
            telemetry::record_authentication(false);
            return Err(Error::InvalidCredentials);
        }

        user.credentials.last_login = Some(self.clock.now());
        self.repo.update(&user).await?;

        tracing::debug!(username = %user.username, "user authenticated");
        telemetry::record_authentication(true);

        Ok(user)
    }

    /// Turn an account off instead of deleting it.
    pub async fn deactivate(&self, username: &str) -> Result<User> {
        let mut user = self.get_by_natural_key(username).await?;
        user.is_active = false;
        self.repo.update(&user).await?;

        tracing::info!(%username, "user deactivated");
        Ok(user)
    }
}
