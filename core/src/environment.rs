//! Environment module - Dependency injection traits
//!
//! Time and secret generation are injected so admission runs deterministically in tests.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of per-member dashboard passkeys.
///
/// Every call must return a fresh secret; implementations never hand out the same
/// passkey twice.
pub trait PasskeyGenerator: Send + Sync {
    /// Generate one plaintext passkey.
    fn generate(&self) -> String;
}
