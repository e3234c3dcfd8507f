//! Model-level error types.

use thiserror::Error;

/// Errors produced while validating domain values.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The identifier does not follow the `name@realm` naming convention.
    #[error("invalid username '{0}'")]
    InvalidUsername(String),
}
