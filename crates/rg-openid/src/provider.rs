//! Provider discovery, authorization-URL construction, and code exchange.
//!
//! Discovery runs fresh on every call. The `openidconnect` client uses
//! type-state generics that make caching a configured client impractical,
//! and a fresh discovery also picks up provider key rotation.

use std::borrow::Cow;

use async_trait::async_trait;
use openidconnect::core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata};
use openidconnect::{
    AuthType, AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope,
};
use rg_model::OpenIdRealm;

use crate::claims::{OpenIdClaims, decode_jwt_payload};
use crate::error::{OpenIdError, OpenIdResult};
use crate::http::ReqwestHttpClient;
use crate::state::AuthStateRecord;

/// Output of authorization-URL construction.
///
/// The `state_token` is the public handle returned to the provider and
/// back; `nonce` and `pkce_verifier` are private verification material
/// that must be persisted until the callback arrives.
#[derive(Debug, Clone)]
pub struct AuthorizationParts {
    /// The authorization URL the caller is redirected to.
    pub url: String,
    /// Public single-use state token.
    pub state_token: String,
    /// Nonce to verify the eventual ID token against.
    pub nonce: String,
    /// PKCE code verifier matching the challenge in the URL.
    pub pkce_verifier: String,
}

/// Provider-facing operations of the login flow.
#[async_trait]
pub trait OpenIdProvider: Send + Sync {
    /// Discovers the realm's provider and builds the authorization URL
    /// (PKCE S256 challenge plus nonce).
    ///
    /// ## Errors
    ///
    /// Returns `OpenIdError::ProviderUnavailable` when discovery fails and
    /// `OpenIdError::InvalidRedirectUrl` for a malformed redirect URL.
    async fn begin_authorization(
        &self,
        realm: &OpenIdRealm,
        redirect_url: &str,
    ) -> OpenIdResult<AuthorizationParts>;

    /// Exchanges the callback code for tokens and verifies the ID token
    /// against the nonce and PKCE verifier recorded at begin time.
    async fn exchange_code(
        &self,
        realm: &OpenIdRealm,
        redirect_url: &str,
        code: &str,
        state: &AuthStateRecord,
    ) -> OpenIdResult<OpenIdClaims>;
}

/// Concrete provider context backed by `openidconnect` over `reqwest`.
pub struct ProviderContext {
    http: ReqwestHttpClient,
}

impl ProviderContext {
    /// Creates a provider context with a fresh HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: ReqwestHttpClient(reqwest::Client::new()),
        }
    }

    async fn discover(&self, realm: &OpenIdRealm) -> OpenIdResult<CoreProviderMetadata> {
        let issuer = IssuerUrl::new(issuer_base(&realm.issuer_url))
            .map_err(|e| OpenIdError::ProviderUnavailable(e.to_string()))?;
        CoreProviderMetadata::discover_async(issuer, &self.http)
            .await
            .map_err(|e| OpenIdError::ProviderUnavailable(e.to_string()))
    }
}

impl Default for ProviderContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpenIdProvider for ProviderContext {
    async fn begin_authorization(
        &self,
        realm: &OpenIdRealm,
        redirect_url: &str,
    ) -> OpenIdResult<AuthorizationParts> {
        let metadata = self.discover(realm).await?;
        let client = CoreClient::from_provider_metadata(
            metadata,
            ClientId::new(realm.client_id.clone()),
            realm.client_secret.clone().map(ClientSecret::new),
        )
        .set_auth_type(AuthType::RequestBody);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let redirect = RedirectUrl::new(redirect_url.to_string())
            .map_err(|e| OpenIdError::InvalidRedirectUrl(e.to_string()))?;

        let mut request = client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .set_redirect_uri(Cow::Owned(redirect))
            .set_pkce_challenge(pkce_challenge);

        for scope in realm.scopes.split_whitespace() {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        if let Some(prompt) = &realm.prompt {
            request = request.add_extra_param("prompt", prompt.clone());
        }
        if let Some(acr) = &realm.acr_values {
            request = request.add_extra_param("acr_values", acr.clone());
        }

        let (url, state_token, nonce) = request.url();

        Ok(AuthorizationParts {
            url: url.to_string(),
            state_token: state_token.secret().clone(),
            nonce: nonce.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        })
    }

    async fn exchange_code(
        &self,
        realm: &OpenIdRealm,
        redirect_url: &str,
        code: &str,
        state: &AuthStateRecord,
    ) -> OpenIdResult<OpenIdClaims> {
        let metadata = self.discover(realm).await?;
        let client = CoreClient::from_provider_metadata(
            metadata,
            ClientId::new(realm.client_id.clone()),
            realm.client_secret.clone().map(ClientSecret::new),
        )
        .set_auth_type(AuthType::RequestBody);

        let redirect = RedirectUrl::new(redirect_url.to_string())
            .map_err(|e| OpenIdError::InvalidRedirectUrl(e.to_string()))?;

        let token_response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| OpenIdError::Exchange(e.to_string()))?
            .set_pkce_verifier(PkceCodeVerifier::new(state.pkce_verifier.clone()))
            .set_redirect_uri(Cow::Owned(redirect))
            .request_async(&self.http)
            .await
            .map_err(|e| OpenIdError::Exchange(e.to_string()))?;

        let id_token = token_response
            .extra_fields()
            .id_token()
            .ok_or_else(|| OpenIdError::Exchange("no id_token in token response".to_string()))?;

        let verifier = client.id_token_verifier();
        id_token
            .claims(&verifier, &Nonce::new(state.nonce.clone()))
            .map_err(|e| OpenIdError::Exchange(e.to_string()))?;

        // The crate verified signature, expiry and nonce above; the payload
        // is decoded once more so non-standard claims stay accessible.
        let raw_jwt = serde_json::to_value(id_token)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        let raw = decode_jwt_payload(&raw_jwt);

        Ok(OpenIdClaims::from_raw(&raw))
    }
}

/// Normalizes a configured issuer URL for discovery: drops an explicit
/// `.well-known` suffix and ensures a trailing slash for URL joining.
fn issuer_base(configured: &str) -> String {
    let base = configured
        .strip_suffix("/.well-known/openid-configuration")
        .unwrap_or(configured);
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuer_base_strips_well_known_suffix() {
        assert_eq!(
            issuer_base("https://sso.example/realm/.well-known/openid-configuration"),
            "https://sso.example/realm/"
        );
    }

    #[test]
    fn issuer_base_ensures_trailing_slash() {
        assert_eq!(issuer_base("https://sso.example/realm"), "https://sso.example/realm/");
        assert_eq!(issuer_base("https://sso.example/realm/"), "https://sso.example/realm/");
    }
}
