//! Login error taxonomy.

use thiserror::Error;

/// Errors that can occur during the login flow.
///
/// All variants except `AuthenticationFailure` carry detail for the
/// server-side log. `complete_login` collapses every failure to
/// `AuthenticationFailure` before it crosses the API boundary.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Storage-layer failure.
    #[error(transparent)]
    Storage(#[from] rg_storage::StorageError),

    /// OpenID protocol failure.
    #[error(transparent)]
    OpenId(#[from] rg_openid::OpenIdError),

    /// Domain validation failure.
    #[error(transparent)]
    Model(#[from] rg_model::ModelError),

    /// The account exists but is disabled.
    #[error("account '{0}' is disabled")]
    AccountDisabled(String),

    /// The account does not exist and the realm does not autocreate.
    #[error("account '{0}' does not exist")]
    NoSuchAccount(String),

    /// Creation collided with an existing record.
    #[error("account '{0}' already exists")]
    AccountConflict(String),

    /// Credential signing failed.
    #[error("credential error: {0}")]
    Credential(String),

    /// Opaque failure returned to callers of `complete_login`.
    #[error("authentication failure")]
    AuthenticationFailure,
}

/// Result type for login operations.
pub type LoginResult<T> = Result<T, LoginError>;
