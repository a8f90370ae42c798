//! HTTP API handlers.
//!
//! - `registrations`: team admission and the authenticated listing
//! - `slots`: public per-pool slot statistics
//! - `admin`: partial-commit review

pub mod admin;
pub mod registrations;
pub mod slots;
