//! Wire types of the access API.
//!
//! Parameter names follow the wire convention (kebab-case, and the
//! historical `CSRFPreventionToken` casing). Length limits are enforced
//! by `validate` before a handler touches any collaborator.

use rg_auth::SessionCredential;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Maximum accepted length of a `redirect-url` parameter.
pub const MAX_REDIRECT_URL_LEN: usize = 255;
/// Maximum accepted length of a `state` parameter.
pub const MAX_STATE_PARAM_LEN: usize = 1024;
/// Maximum accepted length of a `code` parameter.
pub const MAX_CODE_PARAM_LEN: usize = 1024;

/// One entry of the access-root directory index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Name of the child endpoint.
    pub subdir: String,
}

/// Parameters of `POST /auth-url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUrlRequest {
    /// Realm to start the login against.
    pub realm: String,
    /// Redirect URL the provider sends the browser back to.
    #[serde(rename = "redirect-url")]
    pub redirect_url: String,
}

impl AuthUrlRequest {
    /// Verifies the parameter length limits.
    pub fn validate(&self) -> ApiResult<()> {
        check_len("redirect-url", &self.redirect_url, MAX_REDIRECT_URL_LEN)
    }
}

/// Parameters of `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// State token from the provider callback.
    pub state: String,
    /// Authorization code from the provider callback.
    pub code: String,
    /// Redirect URL the login was started with.
    #[serde(rename = "redirect-url")]
    pub redirect_url: String,
}

impl LoginRequest {
    /// Verifies the parameter length limits.
    pub fn validate(&self) -> ApiResult<()> {
        check_len("state", &self.state, MAX_STATE_PARAM_LEN)?;
        check_len("code", &self.code, MAX_CODE_PARAM_LEN)?;
        check_len("redirect-url", &self.redirect_url, MAX_REDIRECT_URL_LEN)
    }
}

/// Successful `POST /login` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed session ticket.
    pub ticket: String,
    /// Full username the session was issued for.
    pub username: String,
    /// Signed CSRF-prevention token.
    #[serde(rename = "CSRFPreventionToken")]
    pub csrf_token: String,
    /// Capability set of the identity.
    pub cap: serde_json::Value,
    /// Cluster name, only for identities with root audit access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clustername: Option<String>,
}

impl From<SessionCredential> for LoginResponse {
    fn from(credential: SessionCredential) -> Self {
        Self {
            ticket: credential.ticket,
            username: credential.username,
            csrf_token: credential.csrf_token,
            cap: credential.capabilities,
            clustername: credential.cluster_name,
        }
    }
}

fn check_len(name: &str, value: &str, max: usize) -> ApiResult<()> {
    if value.len() > max {
        return Err(ApiError::Validation(format!(
            "parameter '{name}' exceeds {max} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_parse_wire_names() {
        let request: AuthUrlRequest = serde_json::from_str(
            r#"{"realm": "r1", "redirect-url": "https://gate.example/cb"}"#,
        )
        .unwrap();
        assert_eq!(request.realm, "r1");
        assert_eq!(request.redirect_url, "https://gate.example/cb");

        let request: LoginRequest = serde_json::from_str(
            r#"{"state": "tok", "code": "c", "redirect-url": "https://gate.example/cb"}"#,
        )
        .unwrap();
        assert_eq!(request.state, "tok");
    }

    #[test]
    fn length_limits_enforced() {
        let request = AuthUrlRequest {
            realm: "r1".to_string(),
            redirect_url: "u".repeat(256),
        };
        assert!(matches!(
            request.validate(),
            Err(ApiError::Validation(msg)) if msg.contains("redirect-url")
        ));

        let request = LoginRequest {
            state: "s".repeat(1025),
            code: "c".to_string(),
            redirect_url: "https://gate.example/cb".to_string(),
        };
        assert!(request.validate().is_err());

        let request = LoginRequest {
            state: "s".repeat(1024),
            code: "c".repeat(1024),
            redirect_url: "u".repeat(255),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn login_response_uses_wire_field_names() {
        let response = LoginResponse::from(SessionCredential {
            username: "a@x.com@r1".to_string(),
            ticket: "RGATE:a@x.com@r1:0::sig".to_string(),
            csrf_token: "0:sig".to_string(),
            capabilities: serde_json::json!({"vms": {"audit": 1}}),
            cluster_name: None,
        });

        let rendered = serde_json::to_value(&response).unwrap();
        assert!(rendered.get("CSRFPreventionToken").is_some());
        assert!(rendered.get("clustername").is_none());
        assert_eq!(rendered["cap"]["vms"]["audit"], 1);
    }

    #[test]
    fn cluster_name_serialized_when_present() {
        let response = LoginResponse::from(SessionCredential {
            username: "a@x.com@r1".to_string(),
            ticket: "t".to_string(),
            csrf_token: "c".to_string(),
            capabilities: serde_json::json!({}),
            cluster_name: Some("prod".to_string()),
        });

        let rendered = serde_json::to_value(&response).unwrap();
        assert_eq!(rendered["clustername"], "prod");
    }
}
