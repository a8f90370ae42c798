//! Administrative read endpoints.
//!
//! - GET /api/admin/registrations/incomplete - Teams with fewer member rows than
//!   their declared size, left behind by a failed commit. Flagged for manual review.

use crate::auth::AdminSession;
use crate::error::AppError;
use crate::server::state::AppState;
use axum::{Json, extract::State};
use fest_admission_core::store::IncompleteRegistration;
use serde::Serialize;

/// Response for the incomplete-registration report.
#[derive(Debug, Serialize)]
pub struct IncompleteResponse {
    /// Partially written teams
    pub registrations: Vec<IncompleteRegistration>,
    /// Number of partially written teams
    pub total: usize,
}

/// Report partially committed teams.
///
/// # Errors
///
/// 401 without a valid bearer token, 500 if the store cannot be read.
pub async fn incomplete_registrations(
    admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<IncompleteResponse>, AppError> {
    let registrations = state.store.incomplete_registrations().await.map_err(|e| {
        AppError::internal("Failed to read incomplete registrations").with_source(e.into())
    })?;

    if !registrations.is_empty() {
        tracing::warn!(
            subject = %admin.identity.subject,
            count = registrations.len(),
            "Incomplete registrations awaiting review"
        );
    }

    Ok(Json(IncompleteResponse {
        total: registrations.len(),
        registrations,
    }))
}
