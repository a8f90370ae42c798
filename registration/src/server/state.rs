//! Application state for the registration HTTP server.

use crate::auth::SessionVerifier;
use crate::orchestrator::RegistrationOrchestrator;
use axum::extract::FromRef;
use fest_admission_core::store::RegistrationStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Admission pipeline (write side)
    pub orchestrator: Arc<RegistrationOrchestrator>,

    /// Registration store for listings and readiness checks
    pub store: Arc<dyn RegistrationStore>,

    /// Verifier for bearer tokens on the read-side endpoints
    pub verifier: Arc<dyn SessionVerifier>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        orchestrator: Arc<RegistrationOrchestrator>,
        store: Arc<dyn RegistrationStore>,
        verifier: Arc<dyn SessionVerifier>,
    ) -> Self {
        Self {
            orchestrator,
            store,
            verifier,
        }
    }
}

impl FromRef<AppState> for Arc<dyn RegistrationStore> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.store)
    }
}
