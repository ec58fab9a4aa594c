mod credentials;
mod display;
mod image;
mod manager;
mod permissions;
mod repository;
pub mod schema;

pub use credentials::*;
pub use image::*;
pub use manager::*;
pub use permissions::*;
pub use repository::*;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Field used as the unique identity key.
pub const USERNAME_FIELD: &str = "username";
/// Fields prompted for besides username and password when creating a
/// superuser.
pub const REQUIRED_FIELDS: &[&str] = &[];

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.@+-]+$").expect("username pattern must compile")
});

pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::new("invalid"));
    }

    Ok(())
}

/// User profile as saved on the record store.
///
/// A profile is either a natural person or a group, internal or external.
/// Title and affiliation are shown for every kind if given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    #[validate(
        length(
            min = 1,
            max = 30,
            message = "Required. 30 characters or fewer."
        ),
        custom(
            function = "validate_username",
            message = "Enter a valid username."
        )
    )]
    pub username: String,
    #[serde(default, skip_deserializing)]
    pub credentials: Credentials,
    #[serde(default, skip_deserializing)]
    pub permissions: Permissions,

    // Name.
    #[validate(length(max = 30))]
    pub title: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub middle_initials: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    pub is_group: bool,
    #[validate(length(max = 200))]
    pub group_name: Option<String>,
    #[validate(length(max = 200))]
    pub affiliation: Option<String>,

    // Contact details.
    #[validate(custom(function = "image::validate_image"))]
    pub image: Option<ImageRef>,
    #[validate(
        length(max = 254),
        email(message = "Enter a valid email address.")
    )]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub phone_alt: Option<String>,
    #[validate(length(max = 100))]
    pub fax: Option<String>,

    // Academic profile.
    pub profile_text: Option<String>,
    pub expertise: Option<String>,
    pub curriculum_vitae: Option<String>,
    pub projects: Option<String>,

    // Publications.
    #[validate(length(max = 255))]
    pub author_code: Option<String>,
    pub publications_staff: Option<String>,
    pub publications_other: Option<String>,

    // Administrative details.
    pub is_staff: bool,
    pub is_active: bool,
    pub is_external: bool,
    #[serde(default, skip_deserializing)]
    pub(crate) agreed: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Blank profile with field defaults.
    ///
    /// Only [`UserManager`] hands these out, after hashing and persisting.
    pub(crate) fn new(username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            credentials: Credentials::default(),
            permissions: Permissions::default(),
            title: None,
            first_name: None,
            middle_initials: None,
            last_name: None,
            is_group: false,
            group_name: None,
            affiliation: None,
            image: None,
            email: None,
            phone: None,
            phone_alt: None,
            fax: None,
            profile_text: None,
            expertise: None,
            curriculum_vitae: None,
            projects: None,
            author_code: None,
            publications_staff: None,
            publications_other: None,
            is_staff: true,
            is_active: true,
            is_external: false,
            agreed: false,
            date_joined: now,
        }
    }

    /// Whether the user agreed to the terms and conditions.
    pub fn agreed(&self) -> bool {
        self.agreed
    }

    /// Record agreement to the terms and conditions.
    pub fn agree_to_terms(&mut self) {
        self.agreed = true;
    }

    /// Whether the account is a superuser.
    pub fn is_superuser(&self) -> bool {
        self.permissions.is_superuser
    }

    /// Inactive accounts hold no permission, superuser or not.
    pub fn has_perm(&self, perm: &str) -> bool {
        self.is_active && self.permissions.grants(perm)
    }

    /// Join [`DEFAULT_GROUP`].
    pub fn add_to_default_group(&mut self) -> bool {
        self.permissions.add_group(Group::new(DEFAULT_GROUP))
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}

/// Optional values merged into a new [`User`] by the account factory.
///
/// Carries no administrative flag and no `agreed`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtraFields {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub middle_initials: Option<String>,
    pub last_name: Option<String>,
    pub is_group: Option<bool>,
    pub group_name: Option<String>,
    pub affiliation: Option<String>,
    pub image: Option<ImageRef>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub phone_alt: Option<String>,
    pub fax: Option<String>,
    pub profile_text: Option<String>,
    pub expertise: Option<String>,
    pub curriculum_vitae: Option<String>,
    pub projects: Option<String>,
    pub author_code: Option<String>,
    pub publications_staff: Option<String>,
    pub publications_other: Option<String>,
    pub is_external: Option<bool>,
}

impl ExtraFields {
    /// Update `email` of [`ExtraFields`].
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Update name fragments of [`ExtraFields`].
    pub fn with_name(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    /// Update `affiliation` of [`ExtraFields`].
    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = Some(affiliation.into());
        self
    }

    /// Turn the profile into a group named `group_name`.
    pub fn as_group(mut self, group_name: impl Into<String>) -> Self {
        self.is_group = Some(true);
        self.group_name = Some(group_name.into());
        self
    }

    /// Mark the profile as external.
    pub fn external(mut self) -> Self {
        self.is_external = Some(true);
        self
    }

    /// Fill `email` unless a value is already present.
    pub(crate) fn email_or(mut self, email: Option<&str>) -> Self {
        if self.email.is_none() {
            self.email = email.map(str::to_owned);
        }
        self
    }

    /// Copy every present value onto `user`.
    pub(crate) fn apply(self, user: &mut User) {
        user.title = self.title.or(user.title.take());
        user.first_name = self.first_name.or(user.first_name.take());
        user.middle_initials =
            self.middle_initials.or(user.middle_initials.take());
        user.last_name = self.last_name.or(user.last_name.take());
        user.is_group = self.is_group.unwrap_or(user.is_group);
        user.group_name = self.group_name.or(user.group_name.take());
        user.affiliation = self.affiliation.or(user.affiliation.take());
        user.image = self.image.or(user.image.take());
        // Blank email behaves as no email.
        user.email = self
            .email
            .filter(|e| !e.is_empty())
            .or(user.email.take());
        user.phone = self.phone.or(user.phone.take());
        user.phone_alt = self.phone_alt.or(user.phone_alt.take());
        user.fax = self.fax.or(user.fax.take());
        user.profile_text = self.profile_text.or(user.profile_text.take());
        user.expertise = self.expertise.or(user.expertise.take());
        user.curriculum_vitae =
            self.curriculum_vitae.or(user.curriculum_vitae.take());
        user.projects = self.projects.or(user.projects.take());
        user.author_code = self.author_code.or(user.author_code.take());
        user.publications_staff =
            self.publications_staff.or(user.publications_staff.take());
        user.publications_other =
            self.publications_other.or(user.publications_other.take());
        user.is_external = self.is_external.unwrap_or(user.is_external);
    }
}
