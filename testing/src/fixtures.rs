//! Builders for committed registrations.
//!
//! Used to put a store into a known occupancy before exercising admission.

use crate::mocks::test_clock;
use crate::store::InMemoryRegistrationStore;
use fest_admission_core::category::{CompetitionTrack, TicketCategory, WorkshopTrack};
use fest_admission_core::environment::Clock;
use fest_admission_core::types::{
    FoodPreference, ParticipantId, PaymentDetails, RegistrationStatus, TeamId, TeamMember,
    TeamRegistration,
};

/// Builder for a committed team.
#[derive(Debug, Clone)]
pub struct CommittedTeam {
    organization: String,
    category: TicketCategory,
    workshop: Option<WorkshopTrack>,
    competition: Option<CompetitionTrack>,
    emails: Vec<String>,
    status: RegistrationStatus,
}

impl CommittedTeam {
    /// Team of `size` members with generated emails under `prefix`.
    #[must_use]
    pub fn new(prefix: &str, size: u32) -> Self {
        Self {
            organization: format!("{prefix} College"),
            category: TicketCategory::EntryWorkshop,
            workshop: Some(WorkshopTrack::Cloud),
            competition: None,
            emails: (1..=size)
                .map(|n| format!("{prefix}-{n}@seed.example.com"))
                .collect(),
            status: RegistrationStatus::Pending,
        }
    }

    /// Team with exactly these member emails.
    #[must_use]
    pub fn with_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emails = emails.into_iter().map(Into::into).collect();
        self
    }

    /// Set category and tracks.
    #[must_use]
    pub fn tracks(
        mut self,
        category: TicketCategory,
        workshop: Option<WorkshopTrack>,
        competition: Option<CompetitionTrack>,
    ) -> Self {
        self.category = category;
        self.workshop = workshop;
        self.competition = competition;
        self
    }

    /// Set the lifecycle status.
    #[must_use]
    pub fn status(mut self, status: RegistrationStatus) -> Self {
        self.status = status;
        self
    }

    /// Build the records.
    #[must_use]
    pub fn build(self) -> (TeamRegistration, Vec<TeamMember>) {
        let now = test_clock().now();
        let id = TeamId::new();
        let team = TeamRegistration {
            id,
            organization: self.organization,
            team_size: u32::try_from(self.emails.len()).unwrap_or(u32::MAX),
            category: self.category,
            workshop_track: self.workshop,
            competition_track: self.competition,
            total_amount: 0,
            payment: PaymentDetails {
                transaction_id: format!("seed-{id}"),
                screenshot_url: None,
            },
            status: self.status,
            created_at: now,
            updated_at: now,
        };
        let members = self
            .emails
            .into_iter()
            .enumerate()
            .map(|(n, email)| TeamMember {
                id: ParticipantId::new(),
                registration_id: id,
                name: format!("Seed Member {}", n + 1),
                email,
                phone: "9000000000".to_string(),
                whatsapp: None,
                gender: None,
                college_year: None,
                department: None,
                food_preference: FoodPreference::Veg,
                accommodation: false,
                workshop_track: self.workshop,
                competition_track: self.competition,
                startup_pitch: None,
                passkey_hash: String::new(),
                attended: false,
                submitted: false,
                created_at: now,
            })
            .collect();
        (team, members)
    }

    /// Build and seed into `store`, returning the team id.
    pub async fn seed(self, store: &InMemoryRegistrationStore) -> TeamId {
        let (team, members) = self.build();
        let id = team.id;
        store.seed(team, members).await;
        id
    }
}

/// Seed teams until the overall pool holds exactly `occupied` participants.
///
/// Teams are `entry_competition` hackathon teams of up to four, so workshop pools stay empty.
pub async fn fill_overall(store: &InMemoryRegistrationStore, occupied: u32) {
    let mut remaining = occupied;
    let mut batch = 0;
    while remaining > 0 {
        let size = remaining.min(4);
        CommittedTeam::new(&format!("fill-{batch}"), size)
            .tracks(
                TicketCategory::EntryCompetition,
                None,
                Some(CompetitionTrack::Hackathon),
            )
            .seed(store)
            .await;
        remaining -= size;
        batch += 1;
    }
}

/// Seed teams until one workshop pool holds exactly `occupied` participants.
pub async fn fill_workshop(store: &InMemoryRegistrationStore, track: WorkshopTrack, occupied: u32) {
    let mut remaining = occupied;
    let mut batch = 0;
    while remaining > 0 {
        let size = remaining.min(4);
        CommittedTeam::new(&format!("{track}-{batch}"), size)
            .tracks(TicketCategory::EntryWorkshop, Some(track), None)
            .seed(store)
            .await;
        remaining -= size;
        batch += 1;
    }
}

/// Seed teams until one competition pool holds exactly `occupied` participants.
pub async fn fill_competition(
    store: &InMemoryRegistrationStore,
    track: CompetitionTrack,
    occupied: u32,
) {
    let mut remaining = occupied;
    let mut batch = 0;
    while remaining > 0 {
        let size = remaining.min(4);
        CommittedTeam::new(&format!("{track}-{batch}"), size)
            .tracks(TicketCategory::EntryCompetition, None, Some(track))
            .seed(store)
            .await;
        remaining -= size;
        batch += 1;
    }
}
