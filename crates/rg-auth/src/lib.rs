//! # rg-auth
//!
//! Login core: account provisioning from verified claims, session
//! credential issuance behind signer and policy seams, and the login
//! orchestrator with its uniform-failure boundary.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod credential;
mod error;
pub mod orchestrator;
pub mod provision;

pub use credential::{
    AccessPolicy, CredentialIssuer, HmacTicketSigner, SessionCredential, StaticAccessPolicy,
    TicketSigner,
};
pub use error::{LoginError, LoginResult};
pub use orchestrator::LoginOrchestrator;
pub use provision::{ProvisionOutcome, UserProvisioner};
