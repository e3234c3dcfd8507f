//! Session credential issuance.
//!
//! Signing and capability evaluation sit behind traits so the host can
//! supply its own ticket scheme and authorization policy. The default
//! signer is HMAC-SHA-384 over a `username:timestamp` payload.

use std::sync::Arc;

use async_trait::async_trait;
use aws_lc_rs::hmac;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use rand::Rng;
use rg_model::Username;

use crate::error::LoginResult;

/// Ticket scheme marker, the first field of every issued ticket.
const TICKET_PREFIX: &str = "RGATE";

/// Ephemeral output of a successful login. Never persisted.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    /// Full username the credential was issued for.
    pub username: String,
    /// Signed session ticket.
    pub ticket: String,
    /// Signed CSRF-prevention token.
    pub csrf_token: String,
    /// Capability set of the identity, as evaluated by the policy.
    pub capabilities: serde_json::Value,
    /// Cluster name, only for identities with root audit access.
    pub cluster_name: Option<String>,
}

/// Signs session tickets and CSRF tokens.
pub trait TicketSigner: Send + Sync {
    /// Issues a signed session ticket for the username.
    ///
    /// ## Errors
    ///
    /// Returns `LoginError::Credential` when signing fails.
    fn issue_ticket(&self, username: &str) -> LoginResult<String>;

    /// Issues a signed CSRF-prevention token for the username.
    fn issue_csrf_token(&self, username: &str) -> LoginResult<String>;
}

/// Evaluates the authorization state of an identity.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// The capability set returned to the client on login.
    async fn capabilities(&self, username: &str) -> serde_json::Value;

    /// Whether the identity holds audit-read capability on the root scope.
    async fn has_audit_read(&self, username: &str) -> bool;
}

/// Fixed-answer policy. The default grants nothing.
#[derive(Debug, Clone)]
pub struct StaticAccessPolicy {
    capabilities: serde_json::Value,
    audit_read: bool,
}

impl StaticAccessPolicy {
    /// Creates a policy returning the given answers for every identity.
    #[must_use]
    pub const fn new(capabilities: serde_json::Value, audit_read: bool) -> Self {
        Self {
            capabilities,
            audit_read,
        }
    }
}

impl Default for StaticAccessPolicy {
    fn default() -> Self {
        Self::new(serde_json::json!({}), false)
    }
}

#[async_trait]
impl AccessPolicy for StaticAccessPolicy {
    async fn capabilities(&self, _username: &str) -> serde_json::Value {
        self.capabilities.clone()
    }

    async fn has_audit_read(&self, _username: &str) -> bool {
        self.audit_read
    }
}

/// Default signer: HMAC-SHA-384, base64url signatures.
pub struct HmacTicketSigner {
    key: hmac::Key,
}

impl HmacTicketSigner {
    /// Creates a signer from key material.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA384, secret),
        }
    }

    /// Creates a signer with a fresh random key. Tickets signed with it
    /// do not survive a restart.
    #[must_use]
    pub fn generate() -> Self {
        let mut secret = [0u8; 48];
        rand::rng().fill(&mut secret[..]);
        Self::new(&secret)
    }

    fn sign(&self, payload: &str) -> String {
        URL_SAFE_NO_PAD.encode(hmac::sign(&self.key, payload.as_bytes()).as_ref())
    }

    fn verify(&self, payload: &str, signature: &str) -> bool {
        match URL_SAFE_NO_PAD.decode(signature) {
            Ok(sig) => hmac::verify(&self.key, payload.as_bytes(), &sig).is_ok(),
            Err(_) => false,
        }
    }

    /// Verifies a ticket and returns its username when the signature holds
    /// and the ticket is no older than `max_age_secs`.
    #[must_use]
    pub fn verify_ticket(&self, ticket: &str, max_age_secs: i64) -> Option<String> {
        let (payload, signature) = ticket.rsplit_once("::")?;
        if !self.verify(payload, signature) {
            return None;
        }
        let rest = payload.strip_prefix(TICKET_PREFIX)?.strip_prefix(':')?;
        let (username, ts_hex) = rest.rsplit_once(':')?;
        let issued = i64::from_str_radix(ts_hex, 16).ok()?;
        let age = Utc::now().timestamp() - issued;
        (0..=max_age_secs)
            .contains(&age)
            .then(|| username.to_string())
    }

    /// Verifies a CSRF token against the username it was issued for.
    #[must_use]
    pub fn verify_csrf_token(&self, token: &str, username: &str, max_age_secs: i64) -> bool {
        let Some((ts_hex, signature)) = token.split_once(':') else {
            return false;
        };
        if !self.verify(&format!("{ts_hex}:{username}"), signature) {
            return false;
        }
        let Ok(issued) = i64::from_str_radix(ts_hex, 16) else {
            return false;
        };
        let age = Utc::now().timestamp() - issued;
        (0..=max_age_secs).contains(&age)
    }
}

impl TicketSigner for HmacTicketSigner {
    fn issue_ticket(&self, username: &str) -> LoginResult<String> {
        let payload = format!("{TICKET_PREFIX}:{username}:{:08X}", Utc::now().timestamp());
        let signature = self.sign(&payload);
        Ok(format!("{payload}::{signature}"))
    }

    fn issue_csrf_token(&self, username: &str) -> LoginResult<String> {
        let ts_hex = format!("{:08X}", Utc::now().timestamp());
        let signature = self.sign(&format!("{ts_hex}:{username}"));
        Ok(format!("{ts_hex}:{signature}"))
    }
}

/// Issues session credentials for a provisioned identity.
///
/// Pure read of committed state: issuing never mutates the user store.
pub struct CredentialIssuer {
    signer: Arc<dyn TicketSigner>,
    policy: Arc<dyn AccessPolicy>,
    cluster_name: Option<String>,
}

impl CredentialIssuer {
    /// Creates an issuer with the given signer and policy.
    #[must_use]
    pub fn new(signer: Arc<dyn TicketSigner>, policy: Arc<dyn AccessPolicy>) -> Self {
        Self {
            signer,
            policy,
            cluster_name: None,
        }
    }

    /// Sets the cluster name attached for audit-capable identities.
    #[must_use]
    pub fn with_cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    /// Issues the session credential for a username.
    pub async fn issue(&self, username: &Username) -> LoginResult<SessionCredential> {
        let ticket = self.signer.issue_ticket(username.as_str())?;
        let csrf_token = self.signer.issue_csrf_token(username.as_str())?;
        let capabilities = self.policy.capabilities(username.as_str()).await;
        let cluster_name = if self.policy.has_audit_read(username.as_str()).await {
            self.cluster_name.clone()
        } else {
            None
        };

        Ok(SessionCredential {
            username: username.to_string(),
            ticket,
            csrf_token,
            capabilities,
            cluster_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_roundtrips() {
        let signer = HmacTicketSigner::generate();
        let ticket = signer.issue_ticket("a@x.com@r1").unwrap();

        assert!(ticket.starts_with("RGATE:a@x.com@r1:"));
        assert_eq!(
            signer.verify_ticket(&ticket, 3600).as_deref(),
            Some("a@x.com@r1")
        );
    }

    #[test]
    fn tampered_ticket_rejected() {
        let signer = HmacTicketSigner::generate();
        let ticket = signer.issue_ticket("a@x.com@r1").unwrap();
        let tampered = ticket.replace("a@x.com", "b@x.com");

        assert!(signer.verify_ticket(&tampered, 3600).is_none());
    }

    #[test]
    fn foreign_key_rejected() {
        let ticket = HmacTicketSigner::generate()
            .issue_ticket("a@x.com@r1")
            .unwrap();

        assert!(
            HmacTicketSigner::generate()
                .verify_ticket(&ticket, 3600)
                .is_none()
        );
    }

    #[test]
    fn expired_ticket_rejected() {
        let signer = HmacTicketSigner::generate();
        let stale = Utc::now().timestamp() - 120;
        let payload = format!("RGATE:a@x.com@r1:{stale:08X}");
        let ticket = format!("{payload}::{}", signer.sign(&payload));

        assert!(signer.verify_ticket(&ticket, 60).is_none());
        assert!(signer.verify_ticket(&ticket, 600).is_some());
    }

    #[test]
    fn csrf_token_bound_to_username() {
        let signer = HmacTicketSigner::generate();
        let token = signer.issue_csrf_token("a@x.com@r1").unwrap();

        assert!(signer.verify_csrf_token(&token, "a@x.com@r1", 3600));
        assert!(!signer.verify_csrf_token(&token, "b@x.com@r1", 3600));
        assert!(!signer.verify_csrf_token("junk", "a@x.com@r1", 3600));
    }

    #[tokio::test]
    async fn cluster_name_requires_audit_read() {
        let username = Username::new("ops", "r1").unwrap();
        let signer: Arc<dyn TicketSigner> = Arc::new(HmacTicketSigner::generate());

        let auditor = CredentialIssuer::new(
            Arc::clone(&signer),
            Arc::new(StaticAccessPolicy::new(serde_json::json!({}), true)),
        )
        .with_cluster_name("prod");
        let credential = auditor.issue(&username).await.unwrap();
        assert_eq!(credential.cluster_name.as_deref(), Some("prod"));

        let plain = CredentialIssuer::new(
            Arc::clone(&signer),
            Arc::new(StaticAccessPolicy::default()),
        )
        .with_cluster_name("prod");
        let credential = plain.issue(&username).await.unwrap();
        assert!(credential.cluster_name.is_none());
    }

    #[tokio::test]
    async fn capabilities_come_from_policy() {
        let username = Username::new("ops", "r1").unwrap();
        let issuer = CredentialIssuer::new(
            Arc::new(HmacTicketSigner::generate()),
            Arc::new(StaticAccessPolicy::new(
                serde_json::json!({"vms": {"audit": 1}}),
                false,
            )),
        );

        let credential = issuer.issue(&username).await.unwrap();
        assert_eq!(credential.capabilities["vms"]["audit"], 1);
        assert_eq!(credential.username, "ops@r1");
    }
}
