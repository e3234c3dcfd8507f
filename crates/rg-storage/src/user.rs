//! User store access.
//!
//! Every mutation of the user store document follows the same discipline:
//! take the exclusive lock, read the current document, decide, commit, and
//! only then release the lock. Readers that mutate based on a pre-lock
//! snapshot would race concurrent logins, so the guard is the only way in.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rg_model::UserStoreData;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::StorageResult;

/// Exclusive access to the user store document.
///
/// Holding a guard serializes all store mutations. `read` returns the
/// current document; `commit` atomically replaces it.
#[async_trait]
pub trait UserStoreGuard: Send {
    /// Reads the current document under the lock.
    async fn read(&mut self) -> StorageResult<UserStoreData>;

    /// Atomically replaces the document under the lock.
    async fn commit(&mut self, data: &UserStoreData) -> StorageResult<()>;
}

/// Provider for user store access.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Acquires the exclusive store lock, waiting if another task holds it.
    async fn lock(&self) -> StorageResult<Box<dyn UserStoreGuard + '_>>;
}

/// File-backed user store over a single JSON document.
#[derive(Debug)]
pub struct FileUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileUserStore {
    /// Creates a store persisting the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn lock(&self) -> StorageResult<Box<dyn UserStoreGuard + '_>> {
        let permit = self.lock.lock().await;
        Ok(Box::new(FileUserStoreGuard {
            path: &self.path,
            _permit: permit,
        }))
    }
}

struct FileUserStoreGuard<'a> {
    path: &'a Path,
    _permit: MutexGuard<'a, ()>,
}

#[async_trait]
impl UserStoreGuard for FileUserStoreGuard<'_> {
    async fn read(&mut self) -> StorageResult<UserStoreData> {
        match tokio::fs::read(self.path).await {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            // First use starts from an empty document.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(UserStoreData::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn commit(&mut self, data: &UserStoreData) -> StorageResult<()> {
        let serialized = serde_json::to_vec_pretty(data)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &serialized).await?;
        tokio::fs::rename(&tmp, self.path).await?;
        tracing::debug!(path = %self.path.display(), users = data.users.len(), "committed user store");
        Ok(())
    }
}
