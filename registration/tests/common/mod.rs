//! Shared builders for registration integration tests.

#![allow(dead_code)]

use fest_admission_core::category::{CompetitionTrack, TicketCategory, WorkshopTrack};
use fest_admission_core::store::RegistrationStore;
use fest_admission_core::types::FoodPreference;
use fest_admission_testing::{
    InMemoryRegistrationStore, RecordingMailer, SequentialPasskeys, init_test_tracing, test_clock,
};
use fest_registration::notify::{ConfirmationRenderer, NotificationDispatcher};
use fest_registration::{
    AdmissionSettings, MemberRequest, RegistrationOrchestrator, RegistrationRequest,
};
use std::sync::Arc;
use std::time::Duration;

pub fn member(email: &str) -> MemberRequest {
    MemberRequest {
        name: format!("Member {email}"),
        email: email.to_string(),
        phone: "9876543210".to_string(),
        whatsapp: None,
        gender: None,
        college_year: Some("3".to_string()),
        department: Some("CSE".to_string()),
        food_preference: FoodPreference::Veg,
        accommodation: false,
        workshop_track: None,
        competition_track: None,
        startup_pitch: None,
    }
}

pub fn request(
    category: TicketCategory,
    workshop: Option<WorkshopTrack>,
    competition: Option<CompetitionTrack>,
    emails: &[&str],
) -> RegistrationRequest {
    RegistrationRequest {
        organization: "Test Institute of Technology".to_string(),
        ticket_category: category,
        workshop_track: workshop,
        competition_track: competition,
        team_size: None,
        total_amount: 1500,
        transaction_id: "TXN-42".to_string(),
        screenshot_url: Some("https://files.example.com/receipt.png".to_string()),
        members: emails.iter().map(|email| member(email)).collect(),
    }
}

/// Cloud workshop team with members `{prefix}-1@team.example.com` onwards.
pub fn cloud_team(prefix: &str, size: usize) -> RegistrationRequest {
    let emails: Vec<String> = (1..=size)
        .map(|n| format!("{prefix}-{n}@team.example.com"))
        .collect();
    let emails: Vec<&str> = emails.iter().map(String::as_str).collect();
    request(
        TicketCategory::EntryWorkshop,
        Some(WorkshopTrack::Cloud),
        None,
        &emails,
    )
}

pub struct Harness {
    pub store: Arc<InMemoryRegistrationStore>,
    pub mailer: Arc<RecordingMailer>,
    pub orchestrator: Arc<RegistrationOrchestrator>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(
            InMemoryRegistrationStore::new(),
            RecordingMailer::new(),
            AdmissionSettings::default(),
        )
    }

    pub fn with(
        store: InMemoryRegistrationStore,
        mailer: RecordingMailer,
        settings: AdmissionSettings,
    ) -> Self {
        init_test_tracing();
        let store = Arc::new(store);
        let mailer = Arc::new(mailer);
        let dispatcher = NotificationDispatcher::new(
            Arc::new(ConfirmationRenderer::new("TechFest", "https://fest.example.com/dashboard")),
            Arc::clone(&mailer) as _,
            Duration::from_secs(2),
        );
        let dyn_store: Arc<dyn RegistrationStore> = Arc::clone(&store) as _;
        let orchestrator = Arc::new(RegistrationOrchestrator::with_environment(
            dyn_store,
            dispatcher,
            settings,
            Arc::new(test_clock()),
            Arc::new(SequentialPasskeys::new()),
        ));
        Self {
            store,
            mailer,
            orchestrator,
        }
    }

    pub fn dyn_store(&self) -> Arc<dyn RegistrationStore> {
        Arc::clone(&self.store) as _
    }
}
