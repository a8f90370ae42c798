//! Registration committer.
//!
//! Builds the team and member records for an admitted registration and writes them,
//! parent first. Every member gets a fresh passkey; only its SHA-256 digest is stored
//! and the plaintext is handed back once, for the confirmation message.

use crate::request::ValidatedRegistration;
use fest_admission_core::environment::{Clock, PasskeyGenerator};
use fest_admission_core::store::{RegistrationStore, StoreError, TeamWriteFailure};
use fest_admission_core::types::{
    ParticipantId, RegistrationStatus, TeamId, TeamMember, TeamRegistration,
};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;

/// Length of generated passkeys.
pub const PASSKEY_LENGTH: usize = 10;

/// Passkeys drawn from the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPasskeys;

impl PasskeyGenerator for RandomPasskeys {
    fn generate(&self) -> String {
        OsRng
            .sample_iter(&Alphanumeric)
            .take(PASSKEY_LENGTH)
            .map(char::from)
            .collect()
    }
}

/// Hex SHA-256 digest of a passkey, as stored on the member record.
#[must_use]
pub fn hash_passkey(passkey: &str) -> String {
    format!("{:x}", Sha256::digest(passkey.as_bytes()))
}

/// A member as committed, with the plaintext passkey that was never stored.
#[derive(Debug, Clone)]
pub struct CommittedMember {
    /// Stored record
    pub record: TeamMember,
    /// Plaintext passkey
    pub passkey: String,
}

/// A team as committed.
#[derive(Debug, Clone)]
pub struct CommittedTeam {
    /// Stored parent record
    pub team: TeamRegistration,
    /// Stored members, in request order
    pub members: Vec<CommittedMember>,
}

/// Write failure, with what the store holds afterwards.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "commit of team {team_id} failed (team_written={team_written}, members_written={members_written}/{members_expected}): {source}"
)]
pub struct CommitError {
    /// Team being written
    pub team_id: TeamId,
    /// Whether the parent row exists
    pub team_written: bool,
    /// Member rows that exist
    pub members_written: usize,
    /// Member rows the team should have
    pub members_expected: usize,
    /// Addresses another team registered first, when a unique index stopped the write
    pub conflicting_emails: Vec<String>,
    /// Underlying store failure
    #[source]
    pub source: StoreError,
}

impl CommitError {
    /// Whether the failure left rows behind.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.team_written
    }

    /// Whether the write lost an email race and left nothing behind.
    #[must_use]
    pub fn is_clean_duplicate(&self) -> bool {
        !self.team_written
            && matches!(self.source, StoreError::Conflict(_))
            && !self.conflicting_emails.is_empty()
    }
}

/// Writes admitted registrations.
#[derive(Clone)]
pub struct RegistrationCommitter {
    store: Arc<dyn RegistrationStore>,
    clock: Arc<dyn Clock>,
    passkeys: Arc<dyn PasskeyGenerator>,
}

impl RegistrationCommitter {
    /// Create a committer.
    #[must_use]
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        clock: Arc<dyn Clock>,
        passkeys: Arc<dyn PasskeyGenerator>,
    ) -> Self {
        Self {
            store,
            clock,
            passkeys,
        }
    }

    /// Build the records for `registration` without writing them.
    #[must_use]
    pub fn prepare(&self, registration: ValidatedRegistration) -> CommittedTeam {
        let now = self.clock.now();
        let team_id = TeamId::new();
        let team = TeamRegistration {
            id: team_id,
            organization: registration.organization,
            team_size: u32::try_from(registration.members.len()).unwrap_or(u32::MAX),
            category: registration.tracks.category,
            workshop_track: registration.tracks.workshop,
            competition_track: registration.tracks.competition,
            total_amount: registration.total_amount,
            payment: registration.payment,
            status: RegistrationStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let members = registration
            .members
            .into_iter()
            .map(|member| {
                let passkey = self.passkeys.generate();
                CommittedMember {
                    record: TeamMember {
                        id: ParticipantId::new(),
                        registration_id: team_id,
                        name: member.name,
                        email: member.email,
                        phone: member.phone,
                        whatsapp: member.whatsapp,
                        gender: member.gender,
                        college_year: member.college_year,
                        department: member.department,
                        food_preference: member.food_preference,
                        accommodation: member.accommodation,
                        workshop_track: member.workshop_track,
                        competition_track: member.competition_track,
                        startup_pitch: member.startup_pitch,
                        passkey_hash: hash_passkey(&passkey),
                        attended: false,
                        submitted: false,
                        created_at: now,
                    },
                    passkey,
                }
            })
            .collect();

        CommittedTeam { team, members }
    }

    /// Build and write the records for `registration`.
    ///
    /// # Errors
    ///
    /// Returns [`CommitError`] describing which rows exist after a failed write.
    pub async fn commit(
        &self,
        registration: ValidatedRegistration,
    ) -> Result<CommittedTeam, CommitError> {
        let committed = self.prepare(registration);
        let records: Vec<TeamMember> = committed.members.iter().map(|m| m.record.clone()).collect();

        if let Err(TeamWriteFailure {
            team_written,
            members_written,
            source,
        }) = self.store.write_team(&committed.team, &records).await
        {
            let conflicting_emails = if matches!(source, StoreError::Conflict(_)) {
                let unwritten = if team_written {
                    records.get(members_written..).unwrap_or_default()
                } else {
                    records.as_slice()
                };
                self.conflicting_emails(unwritten, team_written).await
            } else {
                Vec::new()
            };
            return Err(CommitError {
                team_id: committed.team.id,
                team_written,
                members_written,
                members_expected: records.len(),
                conflicting_emails,
                source,
            });
        }

        tracing::info!(
            team_id = %committed.team.id,
            members = records.len(),
            "Registration committed"
        );
        Ok(committed)
    }

    /// Emails among `unwritten` that some other team now holds.
    ///
    /// When the lookup fails and the team row was written, the first unwritten member
    /// is the insert that hit the index.
    async fn conflicting_emails(&self, unwritten: &[TeamMember], team_written: bool) -> Vec<String> {
        let emails: Vec<String> = unwritten.iter().map(|m| m.email.clone()).collect();
        match self.store.existing_emails(&emails).await {
            Ok(found) => found,
            Err(error) => {
                tracing::warn!(%error, "Could not look up conflicting emails");
                if team_written {
                    emails.into_iter().take(1).collect()
                } else {
                    Vec::new()
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn passkeys_are_alphanumeric_and_fresh() {
        let generator = RandomPasskeys;
        let keys: HashSet<String> = (0..100).map(|_| generator.generate()).collect();

        assert_eq!(keys.len(), 100);
        for key in &keys {
            assert_eq!(key.len(), PASSKEY_LENGTH);
            assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn passkey_hash_is_sha256_hex() {
        assert_eq!(
            hash_passkey("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
