//! Claim-selection policy for local identities.

use rg_model::UsernameClaim;

use crate::claims::OpenIdClaims;
use crate::error::{OpenIdError, OpenIdResult};

/// Derives the unique-name part of the local identity from the verified
/// claims under the realm's username policy.
///
/// ## Errors
///
/// Returns `OpenIdError::MissingClaim` naming the claim the policy needs
/// when it is absent from the token.
pub fn derive_unique_name(claims: &OpenIdClaims, policy: UsernameClaim) -> OpenIdResult<&str> {
    match policy {
        UsernameClaim::Subject => {
            if claims.subject.is_empty() {
                Err(OpenIdError::MissingClaim("sub"))
            } else {
                Ok(&claims.subject)
            }
        }
        UsernameClaim::Username => claims
            .preferred_username
            .as_deref()
            .ok_or(OpenIdError::MissingClaim("preferred_username")),
        UsernameClaim::Email => claims
            .email
            .as_deref()
            .ok_or(OpenIdError::MissingClaim("email")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> OpenIdClaims {
        OpenIdClaims {
            subject: "user-1".to_string(),
            preferred_username: Some("ada".to_string()),
            email: Some("a@x.com".to_string()),
            ..OpenIdClaims::default()
        }
    }

    #[test]
    fn each_policy_selects_its_claim() {
        let claims = claims();

        assert_eq!(
            derive_unique_name(&claims, UsernameClaim::Subject).unwrap(),
            "user-1"
        );
        assert_eq!(
            derive_unique_name(&claims, UsernameClaim::Username).unwrap(),
            "ada"
        );
        assert_eq!(
            derive_unique_name(&claims, UsernameClaim::Email).unwrap(),
            "a@x.com"
        );
    }

    #[test]
    fn absent_claims_fail_by_name() {
        let empty = OpenIdClaims::default();

        assert!(matches!(
            derive_unique_name(&empty, UsernameClaim::Subject),
            Err(OpenIdError::MissingClaim("sub"))
        ));
        assert!(matches!(
            derive_unique_name(&empty, UsernameClaim::Username),
            Err(OpenIdError::MissingClaim("preferred_username"))
        ));
        assert!(matches!(
            derive_unique_name(&empty, UsernameClaim::Email),
            Err(OpenIdError::MissingClaim("email"))
        ));
    }

    #[test]
    fn policy_ignores_other_claims() {
        let mut claims = claims();
        claims.preferred_username = None;

        // Subject and email policies still succeed.
        assert!(derive_unique_name(&claims, UsernameClaim::Subject).is_ok());
        assert!(derive_unique_name(&claims, UsernameClaim::Email).is_ok());
        assert!(derive_unique_name(&claims, UsernameClaim::Username).is_err());
    }
}
