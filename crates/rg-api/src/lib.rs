//! # rg-api
//!
//! Access REST API: the directory index, `auth-url` and `login` endpoints,
//! their wire DTOs, and the HTTP error boundary that keeps login failures
//! opaque.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod dto;
pub mod error;
pub mod router;
pub mod state;

pub use dto::{AuthUrlRequest, DirectoryEntry, LoginRequest, LoginResponse};
pub use error::{ApiError, ApiResult, ErrorBody};
pub use router::access_router;
pub use state::AccessState;
