//! # rg-storage
//!
//! Storage traits and file-backed implementations: realm-configuration
//! lookup and the exclusive-lock read-modify-write user store.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

mod error;
pub mod realm;
pub mod user;

pub use error::{StorageError, StorageResult};
pub use realm::{FileRealmStore, RealmStore};
pub use user::{FileUserStore, UserStore, UserStoreGuard};
