//! Tests for the in-memory store and recording mailer.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use fest_admission_core::category::{CompetitionTrack, TicketCategory, WorkshopTrack};
use fest_admission_core::environment::Clock;
use fest_admission_core::notify::{MailError, Mailer, OutgoingMessage};
use fest_admission_core::pool::PoolKey;
use fest_admission_core::store::{RegistrationStore, StoreError};
use fest_admission_core::types::RegistrationStatus;
use fest_admission_testing::fixtures::{CommittedTeam, fill_overall, fill_workshop};
use fest_admission_testing::{InMemoryRegistrationStore, RecordingMailer, test_clock};

#[tokio::test]
async fn occupancy_sums_team_sizes_per_pool() {
    let store = InMemoryRegistrationStore::new();
    fill_workshop(&store, WorkshopTrack::Ai, 10).await;
    CommittedTeam::new("pitch", 3)
        .tracks(
            TicketCategory::StartupOnly,
            None,
            Some(CompetitionTrack::Pitch),
        )
        .seed(&store)
        .await;

    let snapshot = store.occupancy(&PoolKey::all()).await.unwrap();

    assert_eq!(snapshot.get(PoolKey::Overall), 13);
    assert_eq!(snapshot.get(PoolKey::Workshop(WorkshopTrack::Ai)), 10);
    assert_eq!(snapshot.get(PoolKey::Workshop(WorkshopTrack::Cloud)), 0);
    assert_eq!(snapshot.get(PoolKey::Competition(CompetitionTrack::Pitch)), 3);
    assert_eq!(store.occupancy_reads(), 1);
}

#[tokio::test]
async fn fill_overall_seeds_exact_occupancy() {
    let store = InMemoryRegistrationStore::new();
    fill_overall(&store, 10).await;

    let snapshot = store.occupancy(&[PoolKey::Overall]).await.unwrap();
    assert_eq!(snapshot.get(PoolKey::Overall), 10);
    assert_eq!(store.registration_count().await, 3);
    assert_eq!(store.member_count().await, 10);
}

#[tokio::test]
async fn rejected_teams_do_not_occupy() {
    let store = InMemoryRegistrationStore::new();
    let id = CommittedTeam::new("gone", 4).seed(&store).await;
    store
        .set_status(id, RegistrationStatus::Rejected, test_clock().now())
        .await;

    let snapshot = store.occupancy(&[PoolKey::Overall]).await.unwrap();
    assert_eq!(snapshot.get(PoolKey::Overall), 0);
}

#[tokio::test]
async fn member_failure_leaves_earlier_rows_in_place() {
    let store = InMemoryRegistrationStore::new();
    store.fail_member_inserts_after(2);
    let (team, members) = CommittedTeam::new("partial", 4).build();

    let failure = store.write_team(&team, &members).await.unwrap_err();

    assert!(failure.team_written);
    assert_eq!(failure.members_written, 2);
    assert_eq!(store.member_count().await, 2);
    let incomplete = store.incomplete_registrations().await.unwrap();
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].members_present, 2);
}

#[tokio::test]
async fn member_insert_rejects_existing_email() {
    let store = InMemoryRegistrationStore::new();
    CommittedTeam::new("first", 1)
        .with_emails(["same@uni.edu"])
        .seed(&store)
        .await;
    let (_, members) = CommittedTeam::new("second", 1)
        .with_emails(["same@uni.edu"])
        .build();

    let err = store.insert_member(&members[0]).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn transactional_write_leaves_nothing_on_conflict() {
    let store = InMemoryRegistrationStore::new().transactional();
    CommittedTeam::new("first", 1)
        .with_emails(["same@uni.edu"])
        .seed(&store)
        .await;
    let (team, members) = CommittedTeam::new("second", 2)
        .with_emails(["own@uni.edu", "same@uni.edu"])
        .build();

    let failure = store.write_team(&team, &members).await.unwrap_err();

    assert!(!failure.team_written);
    assert_eq!(failure.members_written, 0);
    assert!(matches!(failure.source, StoreError::Conflict(_)));
    assert_eq!(store.registration_count().await, 1);
    assert_eq!(store.member_count().await, 1);
    assert!(store.incomplete_registrations().await.unwrap().is_empty());
}

#[tokio::test]
async fn transactional_write_rolls_back_injected_member_failure() {
    let store = InMemoryRegistrationStore::new().transactional();
    store.fail_member_inserts_after(1);
    let (team, members) = CommittedTeam::new("atomic", 3).build();

    let failure = store.write_team(&team, &members).await.unwrap_err();

    assert!(!failure.team_written);
    assert_eq!(store.registration_count().await, 0);
    assert_eq!(store.member_count().await, 0);
}

#[tokio::test]
async fn injected_read_failure_affects_reads_only() {
    let store = InMemoryRegistrationStore::new();
    store.fail_reads();

    assert!(store.ping().await.is_err());
    assert!(store.existing_emails(&["a@b.co".to_string()]).await.is_err());

    let (team, members) = CommittedTeam::new("writes", 1).build();
    store.write_team(&team, &members).await.unwrap();
    assert_eq!(store.registration_count().await, 1);
}

#[tokio::test]
async fn recording_mailer_fails_only_chosen_recipients() {
    let mailer = RecordingMailer::failing_for(["bounce@uni.edu"]);
    let message = |to: &str| OutgoingMessage {
        to: to.to_string(),
        subject: "Registered".to_string(),
        html_body: "<p>hi</p>".to_string(),
        text_body: "hi".to_string(),
    };

    mailer.send(&message("ok@uni.edu")).await.unwrap();
    let err = mailer.send(&message("bounce@uni.edu")).await.unwrap_err();

    assert!(matches!(err, MailError::Transport(_)));
    assert_eq!(mailer.recipients(), vec!["ok@uni.edu"]);
}
