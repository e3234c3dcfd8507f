//! OpenID realm configuration.
//!
//! A realm entry names one external OpenID Connect provider together with
//! the local policy applied to identities arriving through it. Entries are
//! loaded fresh from the realm store on every request.

use serde::{Deserialize, Serialize};

/// Which ID-token claim supplies the unique name of a local identity.
///
/// This is a closed set: realm configuration carrying any other value is
/// rejected when the store parses it, never during a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsernameClaim {
    /// The `sub` claim (provider-stable identifier, the default).
    #[default]
    Subject,
    /// The `preferred_username` claim.
    Username,
    /// The `email` claim.
    Email,
}

impl UsernameClaim {
    /// Name of the ID-token claim this policy reads.
    #[must_use]
    pub const fn claim_name(self) -> &'static str {
        match self {
            Self::Subject => "sub",
            Self::Username => "preferred_username",
            Self::Email => "email",
        }
    }
}

fn default_scopes() -> String {
    "email profile".to_string()
}

/// Configuration of one OpenID Connect realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenIdRealm {
    /// Realm name, the part after the last `@` of usernames it produces.
    ///
    /// Injected by the realm store from the entry key; absent in the
    /// per-realm configuration body.
    #[serde(default)]
    pub realm: String,
    /// Issuer URL used for provider discovery.
    #[serde(rename = "issuer-url")]
    pub issuer_url: String,
    /// OAuth2 client identifier registered at the provider.
    #[serde(rename = "client-id")]
    pub client_id: String,
    /// OAuth2 client secret, absent for public clients.
    #[serde(rename = "client-key", skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Which ID-token claim supplies the unique name.
    #[serde(rename = "username-claim", default)]
    pub username_claim: UsernameClaim,
    /// Whether unknown identities are provisioned on first login.
    #[serde(default)]
    pub autocreate: bool,
    /// Space-separated OAuth2 scopes requested in addition to `openid`.
    #[serde(default = "default_scopes")]
    pub scopes: String,
    /// Optional `prompt` value forwarded on the authorization request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Optional `acr_values` value forwarded on the authorization request.
    #[serde(rename = "acr-values", skip_serializing_if = "Option::is_none")]
    pub acr_values: Option<String>,
}

impl OpenIdRealm {
    /// Creates a realm entry with the mandatory fields and defaults.
    #[must_use]
    pub fn new(
        realm: impl Into<String>,
        issuer_url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            realm: realm.into(),
            issuer_url: issuer_url.into(),
            client_id: client_id.into(),
            client_secret: None,
            username_claim: UsernameClaim::default(),
            autocreate: false,
            scopes: default_scopes(),
            prompt: None,
            acr_values: None,
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the username-claim policy.
    #[must_use]
    pub const fn with_username_claim(mut self, claim: UsernameClaim) -> Self {
        self.username_claim = claim;
        self
    }

    /// Sets whether unknown identities are provisioned on first login.
    #[must_use]
    pub const fn with_autocreate(mut self, autocreate: bool) -> Self {
        self.autocreate = autocreate;
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = scopes.into();
        self
    }

    /// Sets the `prompt` authorization-request value.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Sets the `acr_values` authorization-request value.
    #[must_use]
    pub fn with_acr_values(mut self, acr: impl Into<String>) -> Self {
        self.acr_values = Some(acr.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_realm_has_defaults() {
        let realm = OpenIdRealm::new("r1", "https://issuer.example", "client-1");

        assert_eq!(realm.realm, "r1");
        assert_eq!(realm.username_claim, UsernameClaim::Subject);
        assert!(!realm.autocreate);
        assert_eq!(realm.scopes, "email profile");
        assert!(realm.client_secret.is_none());
    }

    #[test]
    fn builder_pattern_works() {
        let realm = OpenIdRealm::new("r1", "https://issuer.example", "client-1")
            .with_client_secret("s3cret")
            .with_username_claim(UsernameClaim::Email)
            .with_autocreate(true)
            .with_prompt("login");

        assert_eq!(realm.client_secret, Some("s3cret".to_string()));
        assert_eq!(realm.username_claim, UsernameClaim::Email);
        assert!(realm.autocreate);
        assert_eq!(realm.prompt, Some("login".to_string()));
    }

    #[test]
    fn parses_kebab_case_entry() {
        let realm: OpenIdRealm = serde_json::from_str(
            r#"{
                "issuer-url": "https://issuer.example",
                "client-id": "client-1",
                "username-claim": "email",
                "autocreate": true
            }"#,
        )
        .unwrap();

        assert_eq!(realm.realm, "");
        assert_eq!(realm.username_claim, UsernameClaim::Email);
        assert!(realm.autocreate);
        assert_eq!(realm.scopes, "email profile");
    }

    #[test]
    fn unknown_username_claim_rejected() {
        let result = serde_json::from_str::<OpenIdRealm>(
            r#"{
                "issuer-url": "https://issuer.example",
                "client-id": "client-1",
                "username-claim": "nickname"
            }"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn claim_names_match_policy() {
        assert_eq!(UsernameClaim::Subject.claim_name(), "sub");
        assert_eq!(UsernameClaim::Username.claim_name(), "preferred_username");
        assert_eq!(UsernameClaim::Email.claim_name(), "email");
    }
}
