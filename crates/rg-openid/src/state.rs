//! Durable single-use login-state records.
//!
//! Between `begin` and the provider callback, the nonce and PKCE verifier
//! must survive a process restart, so each in-flight login is one JSON
//! record in a fixed state directory keyed by the public state token.
//! Recovery consumes the record by renaming it to a caller-owned path
//! before reading; under concurrent replay exactly one caller wins the
//! rename and every other gets `InvalidState`.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};

use crate::error::{OpenIdError, OpenIdResult};
use crate::provider::AuthorizationParts;

/// Maximum accepted length of a public state token.
const MAX_STATE_TOKEN_LEN: usize = 256;

/// Private verification material for one in-flight login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStateRecord {
    /// Realm the login was started for.
    pub realm: String,
    /// Nonce to verify the eventual ID token against.
    pub nonce: String,
    /// PKCE code verifier matching the challenge sent to the provider.
    pub pkce_verifier: String,
    /// When the login was started.
    pub created_at: DateTime<Utc>,
}

/// File-backed store of single-use login-state records.
#[derive(Debug, Clone)]
pub struct AuthStateStore {
    dir: PathBuf,
}

impl AuthStateStore {
    /// Creates a store over the given state directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Durably records the verification material for a started login,
    /// keyed by the public state token.
    ///
    /// ## Errors
    ///
    /// Returns `OpenIdError::InvalidState` if the token fails the file-name
    /// charset check, and I/O errors from the write itself.
    pub async fn store(&self, realm: &str, parts: &AuthorizationParts) -> OpenIdResult<()> {
        if !valid_state_token(&parts.state_token) {
            return Err(OpenIdError::InvalidState);
        }
        tokio::fs::create_dir_all(&self.dir).await?;

        let record = AuthStateRecord {
            realm: realm.to_string(),
            nonce: parts.nonce.clone(),
            pkce_verifier: parts.pkce_verifier.clone(),
            created_at: Utc::now(),
        };
        let serialized = serde_json::to_vec(&record)?;

        let path = self.dir.join(format!("{}.json", parts.state_token));
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &serialized).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Recovers and consumes the record for a state token, strictly once.
    ///
    /// The record is renamed to a path owned by this call before it is
    /// read, so a token recovered once can never be recovered again, even
    /// under concurrent replay or across a restart.
    ///
    /// ## Errors
    ///
    /// Returns `OpenIdError::InvalidState` for unknown, already consumed,
    /// or malformed tokens.
    pub async fn recover(&self, state_token: &str) -> OpenIdResult<AuthStateRecord> {
        if !valid_state_token(state_token) {
            return Err(OpenIdError::InvalidState);
        }

        let path = self.dir.join(format!("{state_token}.json"));
        let suffix = Alphanumeric.sample_string(&mut rand::rng(), 8);
        let owned = self.dir.join(format!("{state_token}.{suffix}.consumed"));

        match tokio::fs::rename(&path, &owned).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(OpenIdError::InvalidState);
            }
            Err(err) => return Err(err.into()),
        }

        let raw = tokio::fs::read(&owned).await?;
        if let Err(err) = tokio::fs::remove_file(&owned).await {
            tracing::debug!(path = %owned.display(), %err, "failed to remove consumed state record");
        }
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Removes records of logins abandoned longer than `max_age` ago.
    /// Returns the number of removed entries.
    pub async fn purge_expired(&self, max_age: Duration) -> OpenIdResult<usize> {
        let cutoff =
            Utc::now() - chrono::Duration::seconds(i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX));
        let mut removed = 0usize;

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if name.ends_with(".json") {
                let expired = match tokio::fs::read(&path).await {
                    Ok(raw) => match serde_json::from_slice::<AuthStateRecord>(&raw) {
                        Ok(record) => record.created_at < cutoff,
                        Err(err) => {
                            tracing::warn!(path = %path.display(), %err, "unparsable state record, removing");
                            true
                        }
                    },
                    Err(_) => continue,
                };
                if expired && tokio::fs::remove_file(&path).await.is_ok() {
                    removed += 1;
                }
            } else {
                // Leftover temp or consumed markers from interrupted calls.
                let stale = entry
                    .metadata()
                    .await
                    .ok()
                    .and_then(|meta| meta.modified().ok())
                    .and_then(|modified| modified.elapsed().ok())
                    .is_some_and(|age| age > max_age);
                if stale && tokio::fs::remove_file(&path).await.is_ok() {
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }
}

fn valid_state_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_STATE_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-'))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn parts(token: &str) -> AuthorizationParts {
        AuthorizationParts {
            url: format!("https://sso.example/auth?state={token}"),
            state_token: token.to_string(),
            nonce: "nonce-1".to_string(),
            pkce_verifier: "verifier-1".to_string(),
        }
    }

    #[tokio::test]
    async fn store_then_recover_roundtrips() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = AuthStateStore::new(dir.path());

        store.store("r1", &parts("tok-1")).await.unwrap();
        let record = store.recover("tok-1").await.unwrap();

        assert_eq!(record.realm, "r1");
        assert_eq!(record.nonce, "nonce-1");
        assert_eq!(record.pkce_verifier, "verifier-1");
    }

    #[tokio::test]
    async fn second_recover_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = AuthStateStore::new(dir.path());

        store.store("r1", &parts("tok-1")).await.unwrap();
        store.recover("tok-1").await.unwrap();

        let err = store.recover("tok-1").await.unwrap_err();
        assert!(matches!(err, OpenIdError::InvalidState));
    }

    #[tokio::test]
    async fn concurrent_recover_has_one_winner() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = Arc::new(AuthStateStore::new(dir.path()));

        store.store("r1", &parts("tok-1")).await.unwrap();

        let a = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.recover("tok-1").await }
        });
        let b = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.recover("tok-1").await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn unknown_token_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = AuthStateStore::new(dir.path());

        let err = store.recover("never-stored").await.unwrap_err();
        assert!(matches!(err, OpenIdError::InvalidState));
    }

    #[tokio::test]
    async fn malformed_tokens_rejected_before_filesystem_use() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = AuthStateStore::new(dir.path());

        for token in ["../evil", "a/b", "a.b", "", &"x".repeat(257)] {
            let err = store.recover(token).await.unwrap_err();
            assert!(matches!(err, OpenIdError::InvalidState));
        }
    }

    #[tokio::test]
    async fn purge_removes_only_expired_records() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = AuthStateStore::new(dir.path());

        store.store("r1", &parts("fresh")).await.unwrap();

        let old = AuthStateRecord {
            realm: "r1".to_string(),
            nonce: "n".to_string(),
            pkce_verifier: "v".to_string(),
            created_at: Utc::now() - chrono::Duration::hours(2),
        };
        tokio::fs::write(
            dir.path().join("stale.json"),
            serde_json::to_vec(&old).unwrap(),
        )
        .await
        .unwrap();

        let removed = store.purge_expired(Duration::from_secs(600)).await.unwrap();
        assert_eq!(removed, 1);

        assert!(store.recover("stale").await.is_err());
        assert!(store.recover("fresh").await.is_ok());
    }
}
