//! Full usernames and the naming-convention validator.
//!
//! A full username is `<unique_name>@<realm>`. The realm is the part after
//! the LAST `@`, since email-derived unique names legitimately contain `@`
//! themselves (`a@x.com@r1` is the account `a@x.com` in realm `r1`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Maximum byte length of a full username.
pub const MAX_USERNAME_LEN: usize = 128;

/// A validated full username in `<unique_name>@<realm>` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Builds and validates a full username from its two parts.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidUsername`] when either part violates
    /// the naming convention or the combined id exceeds
    /// [`MAX_USERNAME_LEN`] bytes.
    pub fn new(unique_name: &str, realm: &str) -> Result<Self, ModelError> {
        let full = format!("{unique_name}@{realm}");
        if full.len() > MAX_USERNAME_LEN
            || !valid_unique_name(unique_name)
            || !valid_realm_name(realm)
        {
            return Err(ModelError::InvalidUsername(full));
        }
        Ok(Self(full))
    }

    /// Parses and validates a full username, splitting at the last `@`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidUsername`] when the string has no
    /// realm separator or either part violates the naming convention.
    pub fn parse(full: &str) -> Result<Self, ModelError> {
        match full.rsplit_once('@') {
            Some((unique_name, realm)) => Self::new(unique_name, realm),
            None => Err(ModelError::InvalidUsername(full.to_string())),
        }
    }

    /// The full `<unique_name>@<realm>` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The unique-name part (everything before the last `@`).
    #[must_use]
    pub fn unique_name(&self) -> &str {
        match self.0.rsplit_once('@') {
            Some((name, _)) => name,
            None => &self.0,
        }
    }

    /// The realm part (everything after the last `@`).
    #[must_use]
    pub fn realm(&self) -> &str {
        match self.0.rsplit_once('@') {
            Some((_, realm)) => realm,
            None => "",
        }
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

fn valid_unique_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('@')
        && !name.ends_with('@')
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-' | b'+' | b'@'))
}

fn valid_realm_name(realm: &str) -> bool {
    let mut bytes = realm.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
}
