//! Registration store trait and related types.
//!
//! The store is the only shared mutable resource in the system. Admission reads pool
//! occupancy and existing emails from it, then writes one team and its members.
//!
//! # Implementations
//!
//! - `PostgresRegistrationStore` (in `fest-admission-postgres`): production, writes a team
//!   and its members in one transaction
//! - `InMemoryRegistrationStore` (in `fest-admission-testing`): no transactions, with write
//!   failure injection for partial-commit tests
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` so the store can be shared as
//! `Arc<dyn RegistrationStore>` between request handlers.

use crate::pool::{OccupancySnapshot, PoolKey};
use crate::types::{TeamId, TeamMember, TeamRegistration};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by store and mailer methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors that can occur during store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A unique constraint rejected the write (e.g. an email registered concurrently).
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// A stored row could not be mapped back to a domain record.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

/// What a failed team write left behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("team write failed after team_written={team_written}, members_written={members_written}: {source}")]
pub struct TeamWriteFailure {
    /// Whether the parent registration row exists after the failure
    pub team_written: bool,
    /// How many member rows exist after the failure
    pub members_written: usize,
    /// The failing store operation
    #[source]
    pub source: StoreError,
}

/// A registration whose member rows fall short of its declared team size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncompleteRegistration {
    /// Team identifier
    pub team_id: TeamId,
    /// Organization name
    pub organization: String,
    /// Declared team size
    pub team_size: u32,
    /// Member rows actually present
    pub members_present: u32,
    /// When the parent row was written
    pub created_at: DateTime<Utc>,
}

/// Registration store abstraction.
///
/// Occupancy is always derived from committed rows. Implementations must not cache it
/// across calls.
pub trait RegistrationStore: Send + Sync {
    /// Read the current occupancy of `pools`.
    ///
    /// Sums `team_size` over registrations whose status still occupies capacity:
    /// all of them for `overall`, those with a matching track for workshop and
    /// competition pools.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: query failed
    fn occupancy<'a>(
        &'a self,
        pools: &'a [PoolKey],
    ) -> BoxFuture<'a, Result<OccupancySnapshot, StoreError>>;

    /// Return every email in `emails` that already belongs to a member.
    ///
    /// `emails` are expected normalized; matches are exact.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: query failed
    fn existing_emails<'a>(
        &'a self,
        emails: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<String>, StoreError>>;

    /// Insert the parent registration row.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: write failed
    fn insert_registration<'a>(
        &'a self,
        team: &'a TeamRegistration,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Insert one member row.
    ///
    /// # Errors
    ///
    /// - `Conflict`: the email is already registered
    /// - `DatabaseError`: write failed
    fn insert_member<'a>(&'a self, member: &'a TeamMember) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Write a team and its members, parent first.
    ///
    /// The default writes rows one by one and reports how far it got. Stores with
    /// transactions override it so a failure leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns [`TeamWriteFailure`] describing which rows exist after the failure.
    fn write_team<'a>(
        &'a self,
        team: &'a TeamRegistration,
        members: &'a [TeamMember],
    ) -> BoxFuture<'a, Result<(), TeamWriteFailure>> {
        Box::pin(write_rows_individually(self, team, members))
    }

    /// All registrations, newest first.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: query failed
    fn list_registrations(&self) -> BoxFuture<'_, Result<Vec<TeamRegistration>, StoreError>>;

    /// Members of one registration.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: query failed
    fn members_of(&self, team_id: TeamId) -> BoxFuture<'_, Result<Vec<TeamMember>, StoreError>>;

    /// Registrations with fewer member rows than their declared team size.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: query failed
    fn incomplete_registrations(
        &self,
    ) -> BoxFuture<'_, Result<Vec<IncompleteRegistration>, StoreError>>;

    /// Check the store is reachable.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: store unreachable
    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>>;
}

/// Write `team` then each of `members`, one insert at a time.
///
/// On failure the rows already inserted stay; the error says how many.
///
/// # Errors
///
/// Returns [`TeamWriteFailure`] describing which rows exist after the failure.
pub async fn write_rows_individually<S>(
    store: &S,
    team: &TeamRegistration,
    members: &[TeamMember],
) -> Result<(), TeamWriteFailure>
where
    S: RegistrationStore + ?Sized,
{
    store
        .insert_registration(team)
        .await
        .map_err(|source| TeamWriteFailure {
            team_written: false,
            members_written: 0,
            source,
        })?;

    for (written, member) in members.iter().enumerate() {
        store
            .insert_member(member)
            .await
            .map_err(|source| TeamWriteFailure {
                team_written: true,
                members_written: written,
                source,
            })?;
    }

    Ok(())
}
