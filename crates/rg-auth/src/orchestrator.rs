//! Login flow orchestration.
//!
//! `begin_login` and `complete_login` are the two operations the API layer
//! calls. Completion collapses every internal failure to the opaque
//! `AuthenticationFailure` after logging the real cause, so callers can
//! never tell an unknown account from a bad code or a dead provider.

use std::sync::Arc;

use rg_model::Username;
use rg_openid::{AuthStateStore, OpenIdProvider, derive_unique_name};
use rg_storage::RealmStore;

use crate::credential::{CredentialIssuer, SessionCredential};
use crate::error::{LoginError, LoginResult};
use crate::provision::UserProvisioner;

/// Drives the two halves of an OpenID login.
pub struct LoginOrchestrator {
    realms: Arc<dyn RealmStore>,
    provider: Arc<dyn OpenIdProvider>,
    states: AuthStateStore,
    provisioner: UserProvisioner,
    issuer: CredentialIssuer,
}

impl LoginOrchestrator {
    /// Creates an orchestrator from its collaborators.
    #[must_use]
    pub fn new(
        realms: Arc<dyn RealmStore>,
        provider: Arc<dyn OpenIdProvider>,
        states: AuthStateStore,
        provisioner: UserProvisioner,
        issuer: CredentialIssuer,
    ) -> Self {
        Self {
            realms,
            provider,
            states,
            provisioner,
            issuer,
        }
    }

    /// Starts a login against a realm and returns the authorization URL to
    /// redirect the user to.
    ///
    /// The verification material behind the URL's state token is durably
    /// recorded before the URL is handed out, so the eventual callback can
    /// be completed even across a restart.
    ///
    /// ## Errors
    ///
    /// Errors here surface with full detail. Nothing secret has happened
    /// yet, and the caller needs to distinguish an unknown realm from an
    /// unreachable provider.
    pub async fn begin_login(&self, realm: &str, redirect_url: &str) -> LoginResult<String> {
        let config = self.realms.resolve(realm).await?;
        let parts = self.provider.begin_authorization(&config, redirect_url).await?;
        self.states.store(&config.realm, &parts).await?;

        tracing::info!(realm = %config.realm, "started openid login");
        Ok(parts.url)
    }

    /// Completes a login from the provider callback and issues the session
    /// credential.
    ///
    /// `origin` identifies the caller (typically the client address) and
    /// appears in the audit log on both outcomes.
    ///
    /// ## Errors
    ///
    /// Always `LoginError::AuthenticationFailure`, whatever went wrong.
    /// The underlying cause is logged server-side and never leaves the
    /// process.
    pub async fn complete_login(
        &self,
        state: &str,
        code: &str,
        redirect_url: &str,
        origin: &str,
    ) -> LoginResult<SessionCredential> {
        match self.try_complete(state, code, redirect_url).await {
            Ok(credential) => {
                tracing::info!(user = %credential.username, %origin, "openid login succeeded");
                Ok(credential)
            }
            Err(err) => {
                tracing::error!(%origin, error = %err, "openid login failed");
                Err(LoginError::AuthenticationFailure)
            }
        }
    }

    async fn try_complete(
        &self,
        state: &str,
        code: &str,
        redirect_url: &str,
    ) -> LoginResult<SessionCredential> {
        let record = self.states.recover(state).await?;
        let config = self.realms.resolve(&record.realm).await?;
        let claims = self
            .provider
            .exchange_code(&config, redirect_url, code, &record)
            .await?;

        let unique_name = derive_unique_name(&claims, config.username_claim)?;
        let username = Username::new(unique_name, &config.realm)?;

        self.provisioner
            .ensure_account(&username, &claims, config.autocreate)
            .await?;

        // Group sync is best-effort: a failed membership write must not
        // void an otherwise valid login.
        if let Some(groups) = &claims.groups {
            if let Err(err) = self.provisioner.sync_groups(&username, groups).await {
                tracing::warn!(user = %username, error = %err, "group sync failed");
            }
        }

        self.issuer.issue(&username).await
    }
}
