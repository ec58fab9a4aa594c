//! Handle record store requests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;
use validator::Validate;

use crate::error::{Error, Result};
use crate::user::{Credentials, Group, ImageRef, PasswordHash, Permissions, User};

/// Port for user persistence, keyed by username.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new record.
    ///
    /// Fails with [`Error::UsernameTaken`] when the username exists.
    async fn create(&self, user: &User) -> Result<()>;

    /// Find a record using its `username`.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Overwrite an existing record.
    ///
    /// Fails with [`Error::NotFound`] when the username is unknown.
    async fn update(&self, user: &User) -> Result<()>;
}

/// Records held in process memory.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserRepository {
    /// Create a new empty [`MemoryUserRepository`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<()> {
        user.validate()?;

        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(Error::UsernameTaken {
                username: user.username.clone(),
            });
        }
        users.insert(user.username.clone(), user.clone());

        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn update(&self, user: &User) -> Result<()> {
        user.validate()?;

        match self.users.write().await.get_mut(&user.username) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            },
            None => Err(Error::NotFound {
                username: user.username.clone(),
            }),
        }
    }
}

/// User record as stored in PostgreSQL.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRecord {
    username: String,
    password: String,
    last_login: Option<DateTime<Utc>>,
    is_superuser: bool,
    #[sqlx(json)]
    groups: Vec<Group>,
    user_permissions: Vec<String>,
    title: Option<String>,
    first_name: Option<String>,
    middle_initials: Option<String>,
    last_name: Option<String>,
    is_group: bool,
    group_name: Option<String>,
    affiliation: Option<String>,
    image: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    phone_alt: Option<String>,
    fax: Option<String>,
    profile_text: Option<String>,
    expertise: Option<String>,
    curriculum_vitae: Option<String>,
    projects: Option<String>,
    author_code: Option<String>,
    publications_staff: Option<String>,
    publications_other: Option<String>,
    is_staff: bool,
    is_active: bool,
    is_external: bool,
    agreed: bool,
    date_joined: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            username: record.username,
            credentials: Credentials {
                password: PasswordHash::new(record.password),
                last_login: record.last_login,
            },
            permissions: Permissions {
                is_superuser: record.is_superuser,
                groups: record.groups,
                user_permissions: record.user_permissions,
            },
            title: record.title,
            first_name: record.first_name,
            middle_initials: record.middle_initials,
            last_name: record.last_name,
            is_group: record.is_group,
            group_name: record.group_name,
            affiliation: record.affiliation,
            image: record.image.map(ImageRef::new),
            email: record.email,
            phone: record.phone,
            phone_alt: record.phone_alt,
            fax: record.fax,
            profile_text: record.profile_text,
            expertise: record.expertise,
            curriculum_vitae: record.curriculum_vitae,
            projects: record.projects,
            author_code: record.author_code,
            publications_staff: record.publications_staff,
            publications_other: record.publications_other,
            is_staff: record.is_staff,
            is_active: record.is_active,
            is_external: record.is_external,
            agreed: record.agreed,
            date_joined: record.date_joined,
        }
    }
}

const COLUMNS: &str = r#"
    username, password, last_login, is_superuser, groups, user_permissions,
    title, first_name, middle_initials, last_name, is_group, group_name,
    affiliation, image, email, phone, phone_alt, fax, profile_text, expertise,
    curriculum_vitae, projects, author_code, publications_staff,
    publications_other, is_staff, is_active, is_external, agreed, date_joined
"#;

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new [`PgUserRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Bind every column, in [`COLUMNS`] order.
fn bind_user<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    user: &'q User,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(&user.username)
        .bind(user.credentials.password.as_str())
        .bind(user.credentials.last_login)
        .bind(user.permissions.is_superuser)
        .bind(sqlx::types::Json(&user.permissions.groups))
        .bind(&user.permissions.user_permissions)
        .bind(&user.title)
        .bind(&user.first_name)
        .bind(&user.middle_initials)
        .bind(&user.last_name)
        .bind(user.is_group)
        .bind(&user.group_name)
        .bind(&user.affiliation)
        .bind(user.image.as_ref().map(ImageRef::as_str))
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.phone_alt)
        .bind(&user.fax)
        .bind(&user.profile_text)
        .bind(&user.expertise)
        .bind(&user.curriculum_vitae)
        .bind(&user.projects)
        .bind(&user.author_code)
        .bind(&user.publications_staff)
        .bind(&user.publications_other)
        .bind(user.is_staff)
        .bind(user.is_active)
        .bind(user.is_external)
        .bind(user.agreed)
        .bind(user.date_joined)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> Result<()> {
        let query = format!(
            "INSERT INTO users ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
                $21, $22, $23, $24, $25, $26, $27, $28, $29, $30)"
        );

        match bind_user(sqlx::query(&query), user)
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(Error::UsernameTaken {
                    username: user.username.clone(),
                })
            },
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");

        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(User::from))
    }

    async fn update(&self, user: &User) -> Result<()> {
        let query = r#"UPDATE users SET
                password = $2, last_login = $3, is_superuser = $4, groups = $5,
                user_permissions = $6, title = $7, first_name = $8,
                middle_initials = $9, last_name = $10, is_group = $11,
                group_name = $12, affiliation = $13, image = $14, email = $15,
                phone = $16, phone_alt = $17, fax = $18, profile_text = $19,
                expertise = $20, curriculum_vitae = $21, projects = $22,
                author_code = $23, publications_staff = $24,
                publications_other = $25, is_staff = $26, is_active = $27,
                is_external = $28, agreed = $29, date_joined = $30
            WHERE username = $1"#;

        let result = bind_user(sqlx::query(query), user)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound {
                username: user.username.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::tests::user;

    #[tokio::test]
    async fn test_memory_create_and_find() {
        let repo = MemoryUserRepository::new();
        let mut jdoe = user("jdoe");
        jdoe.first_name = Some("Jane".into());

        repo.create(&jdoe).await.unwrap();

        assert_eq!(repo.find_by_username("jdoe").await.unwrap(), Some(jdoe));
        assert_eq!(repo.find_by_username("nobody").await.unwrap(), None);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_unique_username() {
        let repo = MemoryUserRepository::new();
        repo.create(&user("jdoe")).await.unwrap();

        let err = repo.create(&user("jdoe")).await.unwrap_err();
        assert!(matches!(err, Error::UsernameTaken { username } if username == "jdoe"));
    }

    #[tokio::test]
    async fn test_memory_rejects_invalid() {
        let repo = MemoryUserRepository::new();

        let err = repo.create(&user("no spaces")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_update() {
        let repo = MemoryUserRepository::new();
        let mut jdoe = user("jdoe");
        repo.create(&jdoe).await.unwrap();

        jdoe.phone = Some("+61 8 9219 9000".into());
        repo.update(&jdoe).await.unwrap();
        let stored = repo.find_by_username("jdoe").await.unwrap().unwrap();
        assert_eq!(stored.phone.as_deref(), Some("+61 8 9219 9000"));

        let err = repo.update(&user("ghost")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
