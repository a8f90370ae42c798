//! In-memory registration store.
//!
//! Behaves like a document database without multi-document transactions: each insert
//! lands on its own, so a failure halfway through a team leaves the rows already
//! written. Failures can be injected to exercise that path. [`InMemoryRegistrationStore::transactional`]
//! switches team writes to all-or-nothing, the way the Postgres store behaves.

use chrono::{DateTime, Utc};
use fest_admission_core::pool::{OccupancySnapshot, PoolKey};
use fest_admission_core::store::{
    BoxFuture, IncompleteRegistration, RegistrationStore, StoreError, TeamWriteFailure,
    write_rows_individually,
};
use fest_admission_core::types::{RegistrationStatus, TeamId, TeamMember, TeamRegistration};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    registrations: Vec<TeamRegistration>,
    members: Vec<TeamMember>,
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct InMemoryRegistrationStore {
    tables: RwLock<Tables>,
    /// Member inserts left before every further member insert fails
    member_inserts_before_failure: Mutex<Option<usize>>,
    fail_registration_insert: AtomicBool,
    fail_reads: AtomicBool,
    occupancy_reads: AtomicUsize,
    occupancy_delay: Option<Duration>,
    transactional: bool,
}

impl InMemoryRegistrationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep after every occupancy read, widening the window between read and commit.
    #[must_use]
    pub fn with_occupancy_delay(mut self, delay: Duration) -> Self {
        self.occupancy_delay = Some(delay);
        self
    }

    /// Write each team atomically: on any failure no row of the team remains.
    #[must_use]
    pub fn transactional(mut self) -> Self {
        self.transactional = true;
        self
    }

    /// Let `n` more member inserts succeed, then fail every member insert.
    ///
    /// # Panics
    ///
    /// Panics if the failure-injection mutex is poisoned.
    #[allow(clippy::unwrap_used)]
    pub fn fail_member_inserts_after(&self, n: usize) {
        *self.member_inserts_before_failure.lock().unwrap() = Some(n);
    }

    /// Fail every registration insert.
    pub fn fail_registration_inserts(&self) {
        self.fail_registration_insert.store(true, Ordering::SeqCst);
    }

    /// Fail every read (occupancy, duplicate lookup, listing).
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// How many times occupancy has been read.
    #[must_use]
    pub fn occupancy_reads(&self) -> usize {
        self.occupancy_reads.load(Ordering::SeqCst)
    }

    /// Number of registration rows.
    pub async fn registration_count(&self) -> usize {
        self.tables.read().await.registrations.len()
    }

    /// Number of member rows across all teams.
    pub async fn member_count(&self) -> usize {
        self.tables.read().await.members.len()
    }

    /// Fetch one registration.
    pub async fn registration(&self, team_id: TeamId) -> Option<TeamRegistration> {
        self.tables
            .read()
            .await
            .registrations
            .iter()
            .find(|team| team.id == team_id)
            .cloned()
    }

    /// Insert rows directly, bypassing failure injection.
    pub async fn seed(&self, team: TeamRegistration, members: Vec<TeamMember>) {
        let mut tables = self.tables.write().await;
        tables.registrations.push(team);
        tables.members.extend(members);
    }

    /// Change a registration's status, as the approval workflow would.
    pub async fn set_status(&self, team_id: TeamId, status: RegistrationStatus, at: DateTime<Utc>) {
        let mut tables = self.tables.write().await;
        if let Some(team) = tables.registrations.iter_mut().find(|team| team.id == team_id) {
            team.status = status;
            team.updated_at = at;
        }
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::DatabaseError("injected read failure".to_string()));
        }
        Ok(())
    }

    #[allow(clippy::unwrap_used)]
    fn take_member_insert_permit(&self) -> Result<(), StoreError> {
        let mut remaining = self.member_inserts_before_failure.lock().unwrap();
        match remaining.as_mut() {
            None => Ok(()),
            Some(0) => Err(StoreError::DatabaseError(
                "injected member insert failure".to_string(),
            )),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
        }
    }
}

fn occupancy_of(registrations: &[TeamRegistration], pool: PoolKey) -> u32 {
    registrations
        .iter()
        .filter(|team| team.status.occupies_capacity())
        .filter(|team| match pool {
            PoolKey::Overall => true,
            PoolKey::Workshop(track) => team.workshop_track == Some(track),
            PoolKey::Competition(track) => team.competition_track == Some(track),
        })
        .map(|team| team.team_size)
        .sum()
}

impl RegistrationStore for InMemoryRegistrationStore {
    fn occupancy<'a>(
        &'a self,
        pools: &'a [PoolKey],
    ) -> BoxFuture<'a, Result<OccupancySnapshot, StoreError>> {
        Box::pin(async move {
            self.check_reads()?;
            self.occupancy_reads.fetch_add(1, Ordering::SeqCst);

            let snapshot = {
                let tables = self.tables.read().await;
                pools.iter().fold(OccupancySnapshot::new(), |snapshot, pool| {
                    snapshot.with(*pool, occupancy_of(&tables.registrations, *pool))
                })
            };

            if let Some(delay) = self.occupancy_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(snapshot)
        })
    }

    fn existing_emails<'a>(
        &'a self,
        emails: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<String>, StoreError>> {
        Box::pin(async move {
            self.check_reads()?;
            let tables = self.tables.read().await;
            Ok(emails
                .iter()
                .filter(|email| tables.members.iter().any(|member| &member.email == *email))
                .cloned()
                .collect())
        })
    }

    fn insert_registration<'a>(
        &'a self,
        team: &'a TeamRegistration,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            if self.fail_registration_insert.load(Ordering::SeqCst) {
                return Err(StoreError::DatabaseError(
                    "injected registration insert failure".to_string(),
                ));
            }
            self.tables.write().await.registrations.push(team.clone());
            Ok(())
        })
    }

    fn insert_member<'a>(&'a self, member: &'a TeamMember) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.take_member_insert_permit()?;
            let mut tables = self.tables.write().await;
            if tables.members.iter().any(|existing| existing.email == member.email) {
                return Err(StoreError::Conflict(format!(
                    "email {} already registered",
                    member.email
                )));
            }
            tables.members.push(member.clone());
            Ok(())
        })
    }

    fn write_team<'a>(
        &'a self,
        team: &'a TeamRegistration,
        members: &'a [TeamMember],
    ) -> BoxFuture<'a, Result<(), TeamWriteFailure>> {
        if !self.transactional {
            return Box::pin(write_rows_individually(self, team, members));
        }
        Box::pin(async move {
            let rolled_back = |source| TeamWriteFailure {
                team_written: false,
                members_written: 0,
                source,
            };

            if self.fail_registration_insert.load(Ordering::SeqCst) {
                return Err(rolled_back(StoreError::DatabaseError(
                    "injected registration insert failure".to_string(),
                )));
            }
            let mut tables = self.tables.write().await;
            for member in members {
                self.take_member_insert_permit().map_err(rolled_back)?;
                if tables.members.iter().any(|existing| existing.email == member.email) {
                    return Err(rolled_back(StoreError::Conflict(format!(
                        "email {} already registered",
                        member.email
                    ))));
                }
            }
            tables.registrations.push(team.clone());
            tables.members.extend(members.iter().cloned());
            Ok(())
        })
    }

    fn list_registrations(&self) -> BoxFuture<'_, Result<Vec<TeamRegistration>, StoreError>> {
        Box::pin(async move {
            self.check_reads()?;
            let mut registrations = self.tables.read().await.registrations.clone();
            registrations.sort_by(|a, b| b.id.cmp(&a.id));
            Ok(registrations)
        })
    }

    fn members_of(&self, team_id: TeamId) -> BoxFuture<'_, Result<Vec<TeamMember>, StoreError>> {
        Box::pin(async move {
            self.check_reads()?;
            Ok(self
                .tables
                .read()
                .await
                .members
                .iter()
                .filter(|member| member.registration_id == team_id)
                .cloned()
                .collect())
        })
    }

    fn incomplete_registrations(
        &self,
    ) -> BoxFuture<'_, Result<Vec<IncompleteRegistration>, StoreError>> {
        Box::pin(async move {
            self.check_reads()?;
            let tables = self.tables.read().await;
            Ok(tables
                .registrations
                .iter()
                .filter_map(|team| {
                    let present = tables
                        .members
                        .iter()
                        .filter(|member| member.registration_id == team.id)
                        .count();
                    let present = u32::try_from(present).unwrap_or(u32::MAX);
                    (present < team.team_size).then(|| IncompleteRegistration {
                        team_id: team.id,
                        organization: team.organization.clone(),
                        team_size: team.team_size,
                        members_present: present,
                        created_at: team.created_at,
                    })
                })
                .collect())
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move { self.check_reads() })
    }
}
