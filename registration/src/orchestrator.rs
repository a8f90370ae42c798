//! Registration orchestrator.
//!
//! Owns one registration request from payload to response:
//!
//! ```text
//! validate ─► [lock] ─► duplicate guard ─► occupancy ─► policy ─► commit ─► [unlock] ─► notify
//! ```
//!
//! Rejections (invalid payload, duplicate email, full pool) happen before any write,
//! except an email claimed by a concurrent team, which the store's unique index catches
//! during the write. Commit failures are reported with what was written. Notification
//! results are data on the successful outcome, never an error.

use crate::admission::{
    AdmissionMode, CapacityRejection, Decision, DuplicateGuard, GuardVerdict, InventoryCounter,
    decide,
};
use crate::committer::{CommitError, CommittedTeam, RandomPasskeys, RegistrationCommitter};
use crate::metrics;
use crate::notify::{MemberNotificationResult, NotificationDispatcher, NotificationSummary};
use crate::request::{RegistrationRequest, ValidatedRegistration, ValidationError};
use fest_admission_core::environment::{Clock, PasskeyGenerator, SystemClock};
use fest_admission_core::pool::{Capacities, PoolKey};
use fest_admission_core::store::{RegistrationStore, StoreError};
use fest_admission_core::types::{TeamMember, TeamRegistration};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;

/// Default maximum members per team.
pub const DEFAULT_MAX_TEAM_SIZE: usize = 4;

/// Errors that end a registration request.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Payload failed validation; nothing was read or written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Some member emails are already registered; nothing was written.
    #[error("already registered: {}", .0.join(", "))]
    DuplicateEmail(Vec<String>),

    /// A pool was already at or over capacity; nothing was written.
    #[error("{pool} is full ({occupied}/{capacity})")]
    CapacityExceeded {
        /// Full pool
        pool: PoolKey,
        /// Occupancy when checked
        occupied: u32,
        /// Configured maximum
        capacity: u32,
    },

    /// The write failed; rows may have been left behind.
    #[error(transparent)]
    Commit(CommitError),

    /// The store could not be read before admission.
    #[error("registration store unavailable: {0}")]
    Store(#[from] StoreError),
}

impl From<CapacityRejection> for RegistrationError {
    fn from(rejection: CapacityRejection) -> Self {
        Self::CapacityExceeded {
            pool: rejection.pool,
            occupied: rejection.occupied,
            capacity: rejection.capacity,
        }
    }
}

impl From<CommitError> for RegistrationError {
    /// A write stopped by the email index with nothing left behind is a duplicate
    /// rejection; anything else stays a commit failure.
    fn from(error: CommitError) -> Self {
        if error.is_clean_duplicate() {
            Self::DuplicateEmail(error.conflicting_emails)
        } else {
            Self::Commit(error)
        }
    }
}

impl RegistrationError {
    /// Whether the caller can fix the request and resubmit.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::DuplicateEmail(_) | Self::CapacityExceeded { .. }
        )
    }
}

/// Admission settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionSettings {
    /// Pool capacities
    pub capacities: Capacities,
    /// Maximum members per team
    pub max_team_size: usize,
    /// Ordering of concurrent admissions
    pub mode: AdmissionMode,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self {
            capacities: Capacities::default(),
            max_team_size: DEFAULT_MAX_TEAM_SIZE,
            mode: AdmissionMode::default(),
        }
    }
}

/// A committed registration with its notification results.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    /// Stored parent record
    pub team: TeamRegistration,
    /// Stored members
    pub members: Vec<TeamMember>,
    /// Pools the team now occupies
    pub pools_consumed: Vec<PoolKey>,
    /// One result per member
    pub notifications: Vec<MemberNotificationResult>,
    /// Aggregate of `notifications`
    pub summary: NotificationSummary,
}

/// Composes the admission components for one request at a time.
pub struct RegistrationOrchestrator {
    inventory: InventoryCounter,
    guard: DuplicateGuard,
    committer: RegistrationCommitter,
    dispatcher: NotificationDispatcher,
    settings: AdmissionSettings,
    admission_lock: Mutex<()>,
}

impl RegistrationOrchestrator {
    /// Create an orchestrator using the system clock and random passkeys.
    #[must_use]
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        dispatcher: NotificationDispatcher,
        settings: AdmissionSettings,
    ) -> Self {
        Self::with_environment(
            store,
            dispatcher,
            settings,
            Arc::new(SystemClock),
            Arc::new(RandomPasskeys),
        )
    }

    /// Create an orchestrator with an explicit clock and passkey source.
    #[must_use]
    pub fn with_environment(
        store: Arc<dyn RegistrationStore>,
        dispatcher: NotificationDispatcher,
        settings: AdmissionSettings,
        clock: Arc<dyn Clock>,
        passkeys: Arc<dyn PasskeyGenerator>,
    ) -> Self {
        Self {
            inventory: InventoryCounter::new(Arc::clone(&store)),
            guard: DuplicateGuard::new(Arc::clone(&store)),
            committer: RegistrationCommitter::new(store, clock, passkeys),
            dispatcher,
            settings,
            admission_lock: Mutex::new(()),
        }
    }

    /// Admission settings in effect.
    #[must_use]
    pub const fn settings(&self) -> &AdmissionSettings {
        &self.settings
    }

    /// Occupancy reader shared with the slot statistics endpoint.
    #[must_use]
    pub const fn inventory(&self) -> &InventoryCounter {
        &self.inventory
    }

    /// Register a team.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the request is rejected or the write fails.
    /// Notification failures are reported on the outcome instead.
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let started = Instant::now();
        let registration = request
            .validate(self.settings.max_team_size)
            .inspect_err(|error| {
                tracing::info!(%error, "Registration failed validation");
                metrics::record_invalid();
            })?;

        let (committed, pools_consumed) = {
            let _permit = match self.settings.mode {
                AdmissionMode::Serialized => Some(self.admission_lock.lock().await),
                AdmissionMode::Concurrent => None,
            };
            self.admit(registration, started).await?
        };

        let notifications = self.dispatcher.notify(&committed).await;
        let summary = NotificationSummary::from_results(&notifications);
        tracing::info!(
            team_id = %committed.team.id,
            sent = summary.sent,
            failed = summary.failed,
            "Confirmation messages dispatched"
        );

        Ok(RegistrationOutcome {
            members: committed.members.into_iter().map(|m| m.record).collect(),
            team: committed.team,
            pools_consumed,
            notifications,
            summary,
        })
    }

    async fn admit(
        &self,
        registration: ValidatedRegistration,
        started: Instant,
    ) -> Result<(CommittedTeam, Vec<PoolKey>), RegistrationError> {
        let emails = registration.emails();
        let verdict = self.guard.check(&emails).await.inspect_err(|error| {
            tracing::error!(%error, "Duplicate lookup failed");
            metrics::record_store_failure();
        })?;
        if let GuardVerdict::Duplicates(duplicates) = verdict {
            metrics::record_rejected("DUPLICATE_EMAIL", started.elapsed().as_secs_f64());
            return Err(RegistrationError::DuplicateEmail(duplicates));
        }

        let pools = PoolKey::touched_by(&registration.tracks);
        let occupancy = self.inventory.snapshot(&pools).await.inspect_err(|error| {
            tracing::error!(%error, "Occupancy read failed");
            metrics::record_store_failure();
        })?;

        let team_size = registration.team_size();
        match decide(
            team_size,
            &registration.tracks,
            &occupancy,
            &self.settings.capacities,
        ) {
            Decision::Reject(rejection) => {
                tracing::warn!(
                    pool = %rejection.pool,
                    occupied = rejection.occupied,
                    capacity = rejection.capacity,
                    team_size,
                    "Registration rejected: pool full"
                );
                metrics::record_rejected(
                    rejection.reason().code(),
                    started.elapsed().as_secs_f64(),
                );
                Err(rejection.into())
            },
            Decision::Accept {
                pools_consumed,
                seats,
            } => {
                let committed = self
                    .committer
                    .commit(registration)
                    .await
                    .inspect_err(|error| {
                        if error.is_clean_duplicate() {
                            tracing::info!(
                                team_id = %error.team_id,
                                emails = ?error.conflicting_emails,
                                "Registration lost an email race"
                            );
                            metrics::record_rejected(
                                "DUPLICATE_EMAIL",
                                started.elapsed().as_secs_f64(),
                            );
                            return;
                        }
                        tracing::error!(
                            team_id = %error.team_id,
                            team_written = error.team_written,
                            members_written = error.members_written,
                            members_expected = error.members_expected,
                            conflicting_emails = ?error.conflicting_emails,
                            error = %error.source,
                            "Registration commit failed"
                        );
                        metrics::record_commit_failure(error.is_partial());
                    })?;
                metrics::record_admitted(seats, started.elapsed().as_secs_f64());
                Ok((committed, pools_consumed))
            },
        }
    }
}
