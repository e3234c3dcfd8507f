//! Claims extracted from a verified ID token.
//!
//! The `openidconnect` crate verifies signature, issuer, audience, expiry
//! and nonce; the raw payload is then decoded separately so non-standard
//! claims like `groups` stay accessible.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Claim view over a verified ID token.
///
/// `subject` may be empty when the token carried no usable `sub`; the
/// identity resolver turns that into a missing-claim failure when the
/// active policy needs it. Absent optional claims are `None`.
#[derive(Debug, Clone, Default)]
pub struct OpenIdClaims {
    /// The `sub` claim (provider-stable identifier).
    pub subject: String,
    /// The `preferred_username` claim.
    pub preferred_username: Option<String>,
    /// The `email` claim.
    pub email: Option<String>,
    /// The `given_name` claim.
    pub given_name: Option<String>,
    /// The `family_name` claim.
    pub family_name: Option<String>,
    /// The `groups` claim, order preserved.
    pub groups: Option<Vec<String>>,
}

impl OpenIdClaims {
    /// Builds the claim view from a decoded token payload.
    #[must_use]
    pub fn from_raw(raw: &HashMap<String, serde_json::Value>) -> Self {
        Self {
            subject: string_claim(raw, "sub").unwrap_or_default(),
            preferred_username: string_claim(raw, "preferred_username"),
            email: string_claim(raw, "email"),
            given_name: string_claim(raw, "given_name"),
            family_name: string_claim(raw, "family_name"),
            groups: raw.get("groups").map(list_claim),
        }
    }
}

/// Decodes the payload section of a JWT without validation. The token
/// must already be verified.
#[must_use]
pub fn decode_jwt_payload(token: &str) -> HashMap<String, serde_json::Value> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next()) {
        (Some(_), Some(payload)) => payload,
        _ => return HashMap::new(),
    };
    match URL_SAFE_NO_PAD.decode(payload) {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
        Err(_) => HashMap::new(),
    }
}

fn string_claim(raw: &HashMap<String, serde_json::Value>, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn list_claim(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        serde_json::Value::String(s) => s.split(',').map(|s| s.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: serde_json::Value) -> HashMap<String, serde_json::Value> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn full_payload_extracted() {
        let claims = OpenIdClaims::from_raw(&raw(serde_json::json!({
            "sub": "user-1",
            "preferred_username": "ada",
            "email": "a@x.com",
            "given_name": "Ada",
            "family_name": "Lovelace",
            "groups": ["admins", "devs"]
        })));

        assert_eq!(claims.subject, "user-1");
        assert_eq!(claims.preferred_username.as_deref(), Some("ada"));
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
        assert_eq!(claims.given_name.as_deref(), Some("Ada"));
        assert_eq!(claims.family_name.as_deref(), Some("Lovelace"));
        assert_eq!(
            claims.groups,
            Some(vec!["admins".to_string(), "devs".to_string()])
        );
    }

    #[test]
    fn absent_optionals_are_none() {
        let claims = OpenIdClaims::from_raw(&raw(serde_json::json!({"sub": "user-1"})));

        assert!(claims.preferred_username.is_none());
        assert!(claims.email.is_none());
        assert!(claims.groups.is_none());
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let claims = OpenIdClaims::from_raw(&raw(serde_json::json!({"sub": "", "email": ""})));

        assert!(claims.subject.is_empty());
        assert!(claims.email.is_none());
    }

    #[test]
    fn groups_claim_accepts_string_form() {
        let claims =
            OpenIdClaims::from_raw(&raw(serde_json::json!({"groups": "admins, devs"})));

        assert_eq!(
            claims.groups,
            Some(vec!["admins".to_string(), "devs".to_string()])
        );
    }

    #[test]
    fn non_string_group_entries_skipped() {
        let claims = OpenIdClaims::from_raw(&raw(serde_json::json!({"groups": ["ok", 42]})));

        assert_eq!(claims.groups, Some(vec!["ok".to_string()]));
    }

    #[test]
    fn jwt_payload_decoded() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"user-1","email":"a@x.com"}"#);
        let token = format!("eyJhbGciOiJSUzI1NiJ9.{payload}.sig");

        let decoded = decode_jwt_payload(&token);
        assert_eq!(decoded.get("sub").and_then(|v| v.as_str()), Some("user-1"));
        assert_eq!(decoded.get("email").and_then(|v| v.as_str()), Some("a@x.com"));
    }

    #[test]
    fn malformed_jwt_decodes_empty() {
        assert!(decode_jwt_payload("not-a-jwt").is_empty());
        assert!(decode_jwt_payload("").is_empty());
        assert!(decode_jwt_payload("a.!!!.c").is_empty());
    }
}
