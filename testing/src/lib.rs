//! # Fest Admission Testing
//!
//! Test doubles and fixtures for the registration admission core.
//!
//! This crate provides:
//! - Deterministic environment implementations (`FixedClock`, `SequentialPasskeys`)
//! - [`InMemoryRegistrationStore`]: a store without transactions, with write-failure injection
//! - [`RecordingMailer`]: captures messages and fails for chosen addresses
//! - [`fixtures`]: builders for committed registrations used to seed a store
//!
//! ## Example
//!
//! ```ignore
//! use fest_admission_testing::{InMemoryRegistrationStore, fixtures};
//!
//! #[tokio::test]
//! async fn full_overall_pool() {
//!     let store = InMemoryRegistrationStore::new();
//!     fixtures::fill_overall(&store, 400).await;
//!     // ... submit a registration and expect EventFull
//! }
//! ```

use chrono::{DateTime, Utc};
use fest_admission_core::environment::{Clock, PasskeyGenerator};
use std::sync::atomic::{AtomicU64, Ordering};

pub mod fixtures;
pub mod mailer;
pub mod store;

/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{AtomicU64, Clock, DateTime, Ordering, PasskeyGenerator, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use fest_admission_testing::mocks::FixedClock;
    /// use fest_admission_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable passkeys: `passkey-0001`, `passkey-0002`, ...
    #[derive(Debug, Default)]
    pub struct SequentialPasskeys {
        next: AtomicU64,
    }

    impl SequentialPasskeys {
        /// Start the sequence at 1.
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }
    }

    impl PasskeyGenerator for SequentialPasskeys {
        fn generate(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
            format!("passkey-{n:04}")
        }
    }
}

/// Install a test subscriber that honours `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mailer::RecordingMailer;
pub use mocks::{FixedClock, SequentialPasskeys, test_clock};
pub use store::InMemoryRegistrationStore;
