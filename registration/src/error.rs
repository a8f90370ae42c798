//! HTTP error type.
//!
//! Bridges domain errors and HTTP responses. Every error body carries a machine
//! readable `code` and a `message`; rejections add the fields a client needs to fix
//! the request (the full pool, the duplicate addresses, what a failed commit wrote).

use crate::admission::RejectReason;
use crate::orchestrator::RegistrationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let outcome = orchestrator.register(request).await?;
///     Ok(Json(outcome.into()))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Extra fields merged into the response body
    details: Map<String, Value>,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            details: Map::new(),
            source: None,
        }
    }

    /// Attach a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Add a field to the response body.
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message, "UNAUTHORIZED")
    }

    /// Create a 409 Conflict error with a specific code.
    #[must_use]
    pub fn conflict(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message, code)
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message, "VALIDATION_ERROR")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message, "SERVICE_UNAVAILABLE")
    }

    /// HTTP status of the error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: String,
    message: String,
    #[serde(flatten)]
    details: Map<String, Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
            details: self.details,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(error) => Self::validation(error.to_string()),
            RegistrationError::DuplicateEmail(emails) => Self::conflict(
                "DUPLICATE_EMAIL",
                format!(
                    "These emails are already registered: {}",
                    emails.join(", ")
                ),
            )
            .with_detail("duplicate_emails", json!(emails)),
            RegistrationError::CapacityExceeded {
                pool,
                occupied,
                capacity,
            } => Self::conflict(
                RejectReason::for_pool(pool).code(),
                format!("Registrations for {pool} are closed: {occupied} of {capacity} seats taken"),
            )
            .with_detail("pool", json!(pool.to_string())),
            RegistrationError::Commit(error) => {
                let mut app_error = Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Registration could not be saved",
                    "COMMIT_FAILED",
                )
                .with_detail("team_id", json!(error.team_id))
                .with_detail("team_written", json!(error.team_written))
                .with_detail("members_written", json!(error.members_written))
                .with_detail("members_expected", json!(error.members_expected));
                if !error.conflicting_emails.is_empty() {
                    app_error = app_error
                        .with_detail("conflicting_emails", json!(error.conflicting_emails));
                }
                app_error.with_source(error.into())
            },
            RegistrationError::Store(error) => {
                Self::internal("Registration is temporarily unavailable").with_source(error.into())
            },
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::committer::CommitError;
    use fest_admission_core::category::WorkshopTrack;
    use fest_admission_core::pool::PoolKey;
    use fest_admission_core::store::StoreError;
    use fest_admission_core::types::TeamId;

    #[test]
    fn test_error_display() {
        let err = AppError::validation("organization name is required");
        assert_eq!(
            err.to_string(),
            "[VALIDATION_ERROR] organization name is required"
        );
    }

    #[test]
    fn capacity_maps_to_conflict_with_pool() {
        let err = AppError::from(RegistrationError::CapacityExceeded {
            pool: PoolKey::Workshop(WorkshopTrack::Cloud),
            occupied: 200,
            capacity: 200,
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "WORKSHOP_FULL");
        assert_eq!(err.details["pool"], "workshop:Cloud");
    }

    #[test]
    fn duplicate_lists_every_address() {
        let err = AppError::from(RegistrationError::DuplicateEmail(vec![
            "a@example.com".to_string(),
            "b@example.com".to_string(),
        ]));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "DUPLICATE_EMAIL");
        assert_eq!(
            err.details["duplicate_emails"],
            json!(["a@example.com", "b@example.com"])
        );
    }

    #[test]
    fn commit_failure_is_server_error_with_progress() {
        let err = AppError::from(RegistrationError::Commit(CommitError {
            team_id: TeamId::new(),
            team_written: true,
            members_written: 1,
            members_expected: 3,
            conflicting_emails: Vec::new(),
            source: StoreError::DatabaseError("connection reset".to_string()),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "COMMIT_FAILED");
        assert_eq!(err.details["members_written"], 1);
        assert_eq!(err.details["members_expected"], 3);
        assert!(err.source.is_some());
        assert!(!err.details.contains_key("conflicting_emails"));
    }

    #[test]
    fn partial_conflict_names_the_contested_address() {
        let err = AppError::from(RegistrationError::Commit(CommitError {
            team_id: TeamId::new(),
            team_written: true,
            members_written: 1,
            members_expected: 2,
            conflicting_emails: vec!["shared@example.com".to_string()],
            source: StoreError::Conflict("email shared@example.com already registered".to_string()),
        }));
        assert_eq!(err.code(), "COMMIT_FAILED");
        assert_eq!(err.details["conflicting_emails"], json!(["shared@example.com"]));
    }

    #[test]
    fn clean_email_race_is_a_duplicate_rejection() {
        let err = RegistrationError::from(CommitError {
            team_id: TeamId::new(),
            team_written: false,
            members_written: 0,
            members_expected: 2,
            conflicting_emails: vec!["shared@example.com".to_string()],
            source: StoreError::Conflict("members_email_key".to_string()),
        });
        assert!(err.is_rejection());

        let err = AppError::from(err);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "DUPLICATE_EMAIL");
        assert_eq!(err.details["duplicate_emails"], json!(["shared@example.com"]));
    }
}
