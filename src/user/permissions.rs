//! Group membership and permission capability of a [`User`](super::User).

use serde::{Deserialize, Serialize};

/// Group every new account is expected to join.
pub const DEFAULT_GROUP: &str = "Users";

/// Named permission group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Group {
    /// Create a new [`Group`] without permissions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: Vec::new(),
        }
    }

    /// Update `permissions` of [`Group`].
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Permissions {
    /// Holds every permission without explicit grants.
    pub is_superuser: bool,
    pub groups: Vec<Group>,
    /// Permissions granted directly, outside any group.
    pub user_permissions: Vec<String>,
}

impl Permissions {
    /// Whether `perm` is granted directly, through a group, or by superuser
    /// status.
    pub fn grants(&self, perm: &str) -> bool {
        self.is_superuser
            || self.user_permissions.iter().any(|p| p == perm)
            || self
                .groups
                .iter()
                .any(|g| g.permissions.iter().any(|p| p == perm))
    }

    /// Whether the user belongs to the group named `name`.
    pub fn in_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }

    /// Join `group`. Returns `false` if already a member.
    pub fn add_group(&mut self, group: Group) -> bool {
        if self.in_group(&group.name) {
            return false;
        }
        self.groups.push(group);
        true
    }

    /// Leave the group named `name`. Returns `false` if not a member.
    pub fn remove_group(&mut self, name: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.name != name);
        self.groups.len() != before
    }
}
