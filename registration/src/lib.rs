//! Festival team registration with capacity-constrained admission.
//!
//! A team registers once, for one ticket category and at most one workshop and one
//! competition track. Every request passes through the same pipeline:
//!
//! ```text
//!   POST /api/registrations
//!            │
//!            ▼
//!   ┌─────────────────┐   422
//!   │    validate     │──────►
//!   └─────────────────┘
//!            │            ┌──────────── admission lock (serialized mode) ───────────┐
//!            ▼            │                                                         │
//!   ┌─────────────────┐   │  ┌────────────┐  ┌───────────┐  ┌────────┐  ┌────────┐  │
//!   │  orchestrator   │───┼─►│ duplicates │─►│ occupancy │─►│ policy │─►│ commit │  │
//!   └─────────────────┘   │  └────────────┘  └───────────┘  └────────┘  └────────┘  │
//!            │            │       409                          409         500      │
//!            │            └─────────────────────────────────────────────────────────┘
//!            ▼
//!   ┌─────────────────┐
//!   │     notify      │  per-member results, reported with the 201
//!   └─────────────────┘
//! ```
//!
//! # Capacity
//!
//! Pools are the overall event, each workshop and each competition. A team is
//! rejected only when a pool it touches is already at or over its cap, so the team
//! that takes the last seats may overshoot by up to `team_size - 1`.
//!
//! # Modules
//!
//! - [`admission`]: inventory counter, duplicate guard, admission policy
//! - [`committer`]: passkeys and the parent-then-members write
//! - [`notify`]: confirmation rendering and delivery
//! - [`orchestrator`]: the pipeline above
//! - [`server`] and [`api`]: the HTTP surface

#![forbid(unsafe_code)]

pub mod admission;
pub mod api;
pub mod app;
pub mod auth;
pub mod committer;
pub mod config;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod orchestrator;
pub mod request;
pub mod server;

pub use app::{build_mailer, build_state};
pub use config::Config;
pub use error::AppError;
pub use orchestrator::{
    AdmissionSettings, RegistrationError, RegistrationOrchestrator, RegistrationOutcome,
};
pub use request::{MemberRequest, RegistrationRequest};
pub use server::{AppState, build_router};
