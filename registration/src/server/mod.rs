//! HTTP server for the registration service.
//!
//! - Application state management
//! - Health and readiness endpoints
//! - Correlation ID middleware
//! - Router configuration

pub mod health;
pub mod middleware;
pub mod routes;
pub mod state;

pub use health::health_check;
pub use middleware::{CORRELATION_ID_HEADER, CorrelationId, correlation_id_layer};
pub use routes::build_router;
pub use state::AppState;
