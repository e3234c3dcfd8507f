//! User store document.
//!
//! The user store is a single JSON document holding every account record
//! keyed by full username, plus the group table keyed by group id. The
//! storage layer reads and commits it as one unit under an exclusive lock.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One account record, keyed by full username in [`UserStoreData`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Whether the account may log in.
    pub enabled: bool,
    /// Email address, when supplied by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// First name, when supplied by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    /// Last name, when supplied by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    /// Free-form administrative comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Expiry as a Unix timestamp; `0` means no expiry.
    #[serde(default)]
    pub expire: i64,
}

impl UserRecord {
    /// Creates an enabled record with no profile data.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: true,
            email: None,
            firstname: None,
            lastname: None,
            comment: None,
            expire: 0,
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the first name.
    #[must_use]
    pub fn with_firstname(mut self, name: impl Into<String>) -> Self {
        self.firstname = Some(name.into());
        self
    }

    /// Sets the last name.
    #[must_use]
    pub fn with_lastname(mut self, name: impl Into<String>) -> Self {
        self.lastname = Some(name.into());
        self
    }

    /// Sets whether the account may log in.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for UserRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// One group entry, keyed by group id in [`UserStoreData`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Full usernames of the group members.
    #[serde(default)]
    pub members: BTreeSet<String>,
    /// Free-form administrative comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// The complete user store document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStoreData {
    /// Account records keyed by full username.
    #[serde(default)]
    pub users: BTreeMap<String, UserRecord>,
    /// Group entries keyed by group id.
    #[serde(default)]
    pub groups: BTreeMap<String, GroupRecord>,
}

impl UserStoreData {
    /// Creates an empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            groups: BTreeMap::new(),
        }
    }

    /// Looks up an account record by full username.
    #[must_use]
    pub fn user(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }

    /// Inserts an account record, returning the previous record if the
    /// key was already present.
    pub fn insert_user(&mut self, username: impl Into<String>, record: UserRecord) -> Option<UserRecord> {
        self.users.insert(username.into(), record)
    }

    /// Looks up a group entry by id.
    #[must_use]
    pub fn group(&self, group_id: &str) -> Option<&GroupRecord> {
        self.groups.get(group_id)
    }

    /// Adds a member to an existing group. Returns `false` when the group
    /// does not exist.
    pub fn add_group_member(&mut self, group_id: &str, username: &str) -> bool {
        match self.groups.get_mut(group_id) {
            Some(group) => {
                group.members.insert(username.to_string());
                true
            }
            None => false,
        }
    }
}
