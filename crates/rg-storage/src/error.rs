//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No realm with the given name is configured.
    #[error("realm '{0}' does not exist")]
    UnknownRealm(String),

    /// The realm exists but is not an OpenID realm.
    #[error("realm '{realm}' is not an openid realm (type '{kind}')")]
    WrongRealmType {
        /// Realm name.
        realm: String,
        /// Configured realm type.
        kind: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Checks if this is an unknown-realm error.
    #[must_use]
    pub const fn is_unknown_realm(&self) -> bool {
        matches!(self, Self::UnknownRealm(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_realm_error() {
        let err = StorageError::UnknownRealm("r1".to_string());

        assert!(err.is_unknown_realm());
        assert!(err.to_string().contains("r1"));
    }

    #[test]
    fn wrong_realm_type_names_kind() {
        let err = StorageError::WrongRealmType {
            realm: "r1".to_string(),
            kind: "ldap".to_string(),
        };

        assert!(!err.is_unknown_realm());
        assert!(err.to_string().contains("ldap"));
    }
}
