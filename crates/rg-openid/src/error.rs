//! OpenID protocol error types.

use thiserror::Error;

/// Errors that can occur during the OpenID login flow.
#[derive(Debug, Error)]
pub enum OpenIdError {
    /// Provider discovery failed; the login aborts with no partial state.
    #[error("openid provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The login-state token is unknown, already consumed, or malformed.
    #[error("invalid or expired authentication state")]
    InvalidState,

    /// A claim required by the active username policy is absent.
    #[error("missing claim '{0}' in id token")]
    MissingClaim(&'static str),

    /// Code exchange or ID-token verification failed.
    #[error("token exchange failed: {0}")]
    Exchange(String),

    /// The caller-supplied redirect URL is not a valid URL.
    #[error("invalid redirect url: {0}")]
    InvalidRedirectUrl(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for OpenID operations.
pub type OpenIdResult<T> = Result<T, OpenIdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_has_fixed_message() {
        assert_eq!(
            OpenIdError::InvalidState.to_string(),
            "invalid or expired authentication state"
        );
    }

    #[test]
    fn missing_claim_names_the_claim() {
        let err = OpenIdError::MissingClaim("email");
        assert!(err.to_string().contains("email"));
    }
}
