//! Access API application state.

use std::sync::Arc;

use rg_auth::LoginOrchestrator;

/// Shared state of the access endpoints.
#[derive(Clone)]
pub struct AccessState {
    /// The login orchestrator every handler delegates to.
    pub orchestrator: Arc<LoginOrchestrator>,
}

impl AccessState {
    /// Creates the access state.
    #[must_use]
    pub fn new(orchestrator: Arc<LoginOrchestrator>) -> Self {
        Self { orchestrator }
    }
}
