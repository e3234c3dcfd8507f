//! # rg-model
//!
//! Domain models for RealmGate: the OpenID realm configuration entry, the
//! user store document, and the `Username` type with its naming rules.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

mod error;
pub mod realm;
pub mod user;
pub mod username;

pub use error::ModelError;
pub use realm::{OpenIdRealm, UsernameClaim};
pub use user::{GroupRecord, UserRecord, UserStoreData};
pub use username::Username;
