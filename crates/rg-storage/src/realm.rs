//! Realm-configuration lookup.
//!
//! The realm store resolves a realm name to its [`OpenIdRealm`] entry. The
//! file-backed store parses the realm-configuration document fresh on every
//! resolve, so configuration edits take effect without a restart.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use rg_model::OpenIdRealm;
use serde::Deserialize;

use crate::error::{StorageError, StorageResult};

/// Realm type tag an entry must carry to resolve here.
const OPENID_REALM_TYPE: &str = "openid";

/// Provider for realm-configuration lookup.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait RealmStore: Send + Sync {
    /// Resolves a realm name to its OpenID configuration entry.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::UnknownRealm` if no realm with that name is
    /// configured, and `StorageError::WrongRealmType` if the entry is not
    /// of OpenID type.
    async fn resolve(&self, realm: &str) -> StorageResult<OpenIdRealm>;
}

/// The realm-configuration document layout.
#[derive(Debug, Deserialize)]
struct RealmDocument {
    #[serde(default)]
    realms: BTreeMap<String, serde_json::Value>,
}

/// File-backed realm store over a JSON realm-configuration document.
#[derive(Debug, Clone)]
pub struct FileRealmStore {
    path: PathBuf,
}

impl FileRealmStore {
    /// Creates a store reading the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RealmStore for FileRealmStore {
    async fn resolve(&self, realm: &str) -> StorageResult<OpenIdRealm> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            // A missing document configures no realms at all.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::UnknownRealm(realm.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let document: RealmDocument = serde_json::from_slice(&raw)?;

        let entry = document
            .realms
            .get(realm)
            .ok_or_else(|| StorageError::UnknownRealm(realm.to_string()))?;

        let kind = entry
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown");
        if kind != OPENID_REALM_TYPE {
            return Err(StorageError::WrongRealmType {
                realm: realm.to_string(),
                kind: kind.to_string(),
            });
        }

        let mut config: OpenIdRealm = serde_json::from_value(entry.clone())?;
        config.realm = realm.to_string();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rg_model::UsernameClaim;

    async fn store_with(document: &str) -> (tempfile::TempDir, FileRealmStore) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("domains.json");
        tokio::fs::write(&path, document).await.unwrap();
        (dir, FileRealmStore::new(path))
    }

    #[tokio::test]
    async fn resolves_openid_realm() {
        let (_dir, store) = store_with(
            r#"{
                "realms": {
                    "r1": {
                        "type": "openid",
                        "issuer-url": "https://issuer.example",
                        "client-id": "client-1",
                        "username-claim": "email",
                        "autocreate": true
                    }
                }
            }"#,
        )
        .await;

        let realm = store.resolve("r1").await.unwrap();
        assert_eq!(realm.realm, "r1");
        assert_eq!(realm.username_claim, UsernameClaim::Email);
        assert!(realm.autocreate);
    }

    #[tokio::test]
    async fn unknown_realm_rejected() {
        let (_dir, store) = store_with(r#"{"realms": {}}"#).await;

        let err = store.resolve("nope").await.unwrap_err();
        assert!(matches!(err, StorageError::UnknownRealm(name) if name == "nope"));
    }

    #[tokio::test]
    async fn missing_document_means_no_realms() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileRealmStore::new(dir.path().join("absent.json"));

        let err = store.resolve("r1").await.unwrap_err();
        assert!(err.is_unknown_realm());
    }

    #[tokio::test]
    async fn non_openid_realm_rejected() {
        let (_dir, store) = store_with(
            r#"{
                "realms": {
                    "corp": {"type": "ldap", "server": "ldap.example"}
                }
            }"#,
        )
        .await;

        let err = store.resolve("corp").await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::WrongRealmType { realm, kind } if realm == "corp" && kind == "ldap"
        ));
    }

    #[tokio::test]
    async fn unknown_username_claim_fails_at_parse() {
        let (_dir, store) = store_with(
            r#"{
                "realms": {
                    "r1": {
                        "type": "openid",
                        "issuer-url": "https://issuer.example",
                        "client-id": "client-1",
                        "username-claim": "nickname"
                    }
                }
            }"#,
        )
        .await;

        let err = store.resolve("r1").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
