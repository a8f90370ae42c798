//! Session verification for the read-side endpoints.
//!
//! Registration itself is public. Listing registrations and the incomplete-team report
//! require a bearer token, checked through the opaque [`SessionVerifier`].
//!
//! # Usage
//!
//! ```rust,ignore
//! async fn list(admin: AdminSession, State(state): State<AppState>) -> Result<Json<_>, AppError> {
//!     tracing::debug!(subject = %admin.identity.subject, "Listing registrations");
//!     // ...
//! }
//! ```

use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use constant_time_eq::constant_time_eq;
use fest_admission_core::store::BoxFuture;

/// Verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Who the token belongs to
    pub subject: String,
}

/// Token to identity.
pub trait SessionVerifier: Send + Sync {
    /// Verify `token`, returning the caller or `None` if the token is not valid.
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Option<Identity>>;
}

/// Verifier accepting a single configured admin token.
///
/// With no token configured every request is refused.
#[derive(Clone, Default)]
pub struct StaticTokenVerifier {
    token: Option<String>,
}

impl StaticTokenVerifier {
    /// Accept exactly `token`; `None` or an empty token accepts nothing.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

impl std::fmt::Debug for StaticTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenVerifier")
            .field("configured", &self.token.is_some())
            .finish()
    }
}

impl SessionVerifier for StaticTokenVerifier {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Option<Identity>> {
        Box::pin(async move {
            let expected = self.token.as_deref()?;
            constant_time_eq(expected.as_bytes(), token.as_bytes()).then(|| Identity {
                subject: "admin".to_string(),
            })
        })
    }
}

/// Bearer token extracted from `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
        })?;

        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }

        Ok(Self(token.to_string()))
    }
}

/// Authenticated administrator.
#[derive(Debug, Clone)]
pub struct AdminSession {
    /// The verified caller
    pub identity: Identity,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;
        let identity = state
            .verifier
            .verify(&bearer.0)
            .await
            .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

        Ok(Self { identity })
    }
}
