//! Account provisioning from verified claims.
//!
//! Both operations here follow the store's locking discipline: one
//! exclusive lock around the whole read-check-write, so a concurrent
//! login for the same new identity can never double-create.

use std::sync::Arc;

use rg_model::{UserRecord, Username};
use rg_openid::OpenIdClaims;
use rg_storage::UserStore;

use crate::error::{LoginError, LoginResult};

/// Outcome of [`UserProvisioner::ensure_account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A new account was created from the claims.
    Created,
    /// An enabled account already existed; it was left untouched.
    Existing,
}

/// Ensures the local account behind a resolved identity.
pub struct UserProvisioner {
    store: Arc<dyn UserStore>,
}

impl UserProvisioner {
    /// Creates a provisioner over the given user store.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Ensures an account exists and may log in.
    ///
    /// An existing enabled account is left untouched, whatever the claims
    /// now say. A missing account is created from the optional profile
    /// claims when the realm autocreates, and is a failure otherwise.
    ///
    /// ## Errors
    ///
    /// Returns `LoginError::AccountDisabled` for an existing disabled
    /// account, `LoginError::NoSuchAccount` when the realm does not
    /// autocreate, and `LoginError::AccountConflict` if an insert collides
    /// with an existing record.
    pub async fn ensure_account(
        &self,
        username: &Username,
        claims: &OpenIdClaims,
        autocreate: bool,
    ) -> LoginResult<ProvisionOutcome> {
        let mut guard = self.store.lock().await?;
        let mut data = guard.read().await?;

        if let Some(record) = data.user(username.as_str()) {
            if record.enabled {
                return Ok(ProvisionOutcome::Existing);
            }
            return Err(LoginError::AccountDisabled(username.to_string()));
        }
        if !autocreate {
            return Err(LoginError::NoSuchAccount(username.to_string()));
        }

        let mut record = UserRecord::new();
        record.email = claims.email.clone();
        record.firstname = claims.given_name.clone();
        record.lastname = claims.family_name.clone();

        if data.insert_user(username.as_str(), record).is_some() {
            return Err(LoginError::AccountConflict(username.to_string()));
        }
        guard.commit(&data).await?;
        tracing::info!(user = %username, "created account from openid claims");
        Ok(ProvisionOutcome::Created)
    }

    /// Adds the identity to every claimed group that exists locally.
    ///
    /// Unknown groups are skipped with a warning and do not abort the
    /// remaining memberships. The whole pass is one lock acquisition, one
    /// read and one commit.
    pub async fn sync_groups(&self, username: &Username, claimed: &[String]) -> LoginResult<()> {
        if claimed.is_empty() {
            return Ok(());
        }

        let mut guard = self.store.lock().await?;
        let mut data = guard.read().await?;

        for group in claimed {
            if !data.add_group_member(group, username.as_str()) {
                tracing::warn!(user = %username, group = %group, "claimed group does not exist, skipping");
            }
        }

        guard.commit(&data).await?;
        Ok(())
    }
}
