//! Team registration endpoints.
//!
//! - POST /api/registrations - Submit a team (public)
//! - GET /api/registrations - List registrations with members (bearer token)

use crate::auth::AdminSession;
use crate::error::AppError;
use crate::notify::NotificationSummary;
use crate::request::RegistrationRequest;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use fest_admission_core::types::{TeamId, TeamMember, TeamRegistration};
use serde::Serialize;

/// Response for a committed registration.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    /// Generated team identifier
    pub team_id: TeamId,
    /// Human-readable outcome
    pub message: String,
    /// Confirmation delivery summary
    pub notifications: NotificationSummary,
}

/// One registration with its members.
#[derive(Debug, Serialize)]
pub struct RegistrationView {
    /// Parent record
    #[serde(flatten)]
    pub registration: TeamRegistration,
    /// Member records
    pub members: Vec<TeamMember>,
}

/// Response for the registration listing.
#[derive(Debug, Serialize)]
pub struct RegistrationListResponse {
    /// Registrations, newest first
    pub registrations: Vec<RegistrationView>,
    /// Number of registrations
    pub total: usize,
}

/// Submit a team registration.
///
/// Returns 201 once the team is committed, whatever happened to the confirmation
/// messages; failed recipients are listed under `notifications.failed_emails`.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/registrations \
///   -H "Content-Type: application/json" \
///   -d '{"organization":"MIT","ticket_category":"entry_workshop","workshop_track":"Cloud",
///        "transaction_id":"TXN-1","members":[{"name":"Ada","email":"ada@mit.edu","phone":"555"}]}'
/// ```
///
/// ```json
/// {
///   "team_id": "01890a5d-ac96-774b-bcce-b302099a8057",
///   "message": "Registration successful",
///   "notifications": { "total": 1, "sent": 1, "failed": 0, "failed_emails": [] }
/// }
/// ```
///
/// # Errors
///
/// 422 for an invalid payload, 409 for duplicate emails or a full pool, 500 when the
/// write fails.
pub async fn create_registration(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegistrationResponse>), AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let outcome = state.orchestrator.register(request).await?;

    let message = if outcome.summary.failed == 0 {
        "Registration successful".to_string()
    } else {
        format!(
            "Registration successful; {} confirmation email(s) could not be sent",
            outcome.summary.failed
        )
    };

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            team_id: outcome.team.id,
            message,
            notifications: outcome.summary,
        }),
    ))
}

/// List every registration with its members.
///
/// # Errors
///
/// 401 without a valid bearer token, 500 if the store cannot be read.
pub async fn list_registrations(
    admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<RegistrationListResponse>, AppError> {
    tracing::debug!(subject = %admin.identity.subject, "Listing registrations");

    let teams = state.store.list_registrations().await.map_err(|e| {
        AppError::internal("Failed to list registrations").with_source(e.into())
    })?;

    let mut registrations = Vec::with_capacity(teams.len());
    for registration in teams {
        let members = state.store.members_of(registration.id).await.map_err(|e| {
            AppError::internal("Failed to load team members").with_source(e.into())
        })?;
        registrations.push(RegistrationView {
            registration,
            members,
        });
    }

    Ok(Json(RegistrationListResponse {
        total: registrations.len(),
        registrations,
    }))
}
