//! End-to-end admission through the orchestrator, against the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{Harness, cloud_team, request};
use fest_admission_core::category::{CompetitionTrack, TicketCategory, WorkshopTrack};
use fest_admission_core::environment::Clock;
use fest_admission_core::pool::PoolKey;
use fest_admission_core::store::RegistrationStore;
use fest_admission_core::types::RegistrationStatus;
use fest_admission_testing::fixtures::{
    CommittedTeam, fill_competition, fill_overall, fill_workshop,
};
use fest_admission_testing::{InMemoryRegistrationStore, RecordingMailer, test_clock};
use fest_registration::committer::hash_passkey;
use fest_registration::request::ValidationError;
use fest_registration::{AdmissionSettings, RegistrationError};

#[tokio::test]
async fn three_member_workshop_team_is_committed_and_notified() {
    let harness = Harness::new();
    let cloud = PoolKey::Workshop(WorkshopTrack::Cloud);
    let before = harness.orchestrator.inventory().occupancy(cloud).await.unwrap();

    let outcome = harness
        .orchestrator
        .register(request(
            TicketCategory::EntryWorkshop,
            Some(WorkshopTrack::Cloud),
            None,
            &["ada@mit.edu", "grace@mit.edu", "linus@mit.edu"],
        ))
        .await
        .unwrap();

    assert_eq!(harness.store.registration_count().await, 1);
    assert_eq!(harness.store.member_count().await, 3);
    assert_eq!(outcome.team.team_size, 3);
    assert_eq!(outcome.team.status, RegistrationStatus::Pending);
    assert_eq!(outcome.team.workshop_track, Some(WorkshopTrack::Cloud));
    assert_eq!(outcome.team.competition_track, None);
    assert_eq!(outcome.pools_consumed, vec![PoolKey::Overall, cloud]);

    let after = harness.orchestrator.inventory().occupancy(cloud).await.unwrap();
    assert_eq!(after, before + 3);

    assert_eq!(outcome.summary.total, 3);
    assert_eq!(outcome.summary.sent, 3);
    assert_eq!(outcome.summary.failed, 0);
    assert!(outcome.summary.failed_emails.is_empty());
    assert_eq!(harness.mailer.sent().len(), 3);
}

#[tokio::test]
async fn every_member_gets_a_distinct_passkey_stored_only_as_a_hash() {
    let harness = Harness::new();

    let outcome = harness
        .orchestrator
        .register(cloud_team("keys", 3))
        .await
        .unwrap();

    let stored = harness.store.members_of(outcome.team.id).await.unwrap();
    assert_eq!(stored.len(), 3);
    for (n, member) in stored.iter().enumerate() {
        let passkey = format!("passkey-{:04}", n + 1);
        assert_eq!(member.passkey_hash, hash_passkey(&passkey));
        assert_ne!(member.passkey_hash, passkey);
    }

    let messages = harness.mailer.sent();
    for member in &stored {
        let message = messages
            .iter()
            .find(|m| m.to == member.email)
            .expect("one message per member");
        let passkey_line = message
            .text_body
            .lines()
            .find(|line| line.contains("passkey-"))
            .unwrap();
        let passkey = passkey_line.rsplit(' ').next().unwrap();
        assert_eq!(hash_passkey(passkey), member.passkey_hash);
    }
}

#[tokio::test]
async fn full_event_rejects_with_no_writes() {
    let harness = Harness::new();
    fill_overall(&harness.store, 400).await;
    let registrations = harness.store.registration_count().await;
    let members = harness.store.member_count().await;

    let err = harness
        .orchestrator
        .register(cloud_team("late", 2))
        .await
        .unwrap_err();

    match err {
        RegistrationError::CapacityExceeded {
            pool,
            occupied,
            capacity,
        } => {
            assert_eq!(pool, PoolKey::Overall);
            assert_eq!(occupied, 400);
            assert_eq!(capacity, 400);
        },
        other => panic!("expected EVENT_FULL, got {other:?}"),
    }
    assert_eq!(harness.store.registration_count().await, registrations);
    assert_eq!(harness.store.member_count().await, members);
    assert!(harness.mailer.sent().is_empty());
}

#[tokio::test]
async fn last_team_may_overshoot_the_event_cap() {
    let harness = Harness::new();
    fill_overall(&harness.store, 399).await;

    harness
        .orchestrator
        .register(cloud_team("last", 4))
        .await
        .unwrap();
    assert_eq!(
        harness
            .orchestrator
            .inventory()
            .occupancy(PoolKey::Overall)
            .await
            .unwrap(),
        403
    );

    let err = harness
        .orchestrator
        .register(cloud_team("after", 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::CapacityExceeded {
            pool: PoolKey::Overall,
            occupied: 403,
            ..
        }
    ));
}

#[tokio::test]
async fn full_workshop_rejects_only_that_workshop() {
    let harness = Harness::new();
    fill_workshop(&harness.store, WorkshopTrack::Cloud, 200).await;

    let err = harness
        .orchestrator
        .register(cloud_team("cloudy", 2))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::CapacityExceeded {
            pool: PoolKey::Workshop(WorkshopTrack::Cloud),
            ..
        }
    ));

    harness
        .orchestrator
        .register(request(
            TicketCategory::EntryWorkshop,
            Some(WorkshopTrack::Ai),
            None,
            &["neural@uni.edu"],
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn full_competition_rejects_optional_competition_on_workshop_ticket() {
    let harness = Harness::new();
    fill_competition(&harness.store, CompetitionTrack::Hackathon, 250).await;

    let err = harness
        .orchestrator
        .register(request(
            TicketCategory::EntryWorkshop,
            Some(WorkshopTrack::Cybersecurity),
            Some(CompetitionTrack::Hackathon),
            &["hacker@uni.edu"],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::CapacityExceeded {
            pool: PoolKey::Competition(CompetitionTrack::Hackathon),
            ..
        }
    ));
}

#[tokio::test]
async fn existing_email_rejects_whole_team_with_no_writes() {
    let harness = Harness::new();
    CommittedTeam::new("seed", 1)
        .with_emails(["taken@college.edu"])
        .seed(&harness.store)
        .await;

    let err = harness
        .orchestrator
        .register(request(
            TicketCategory::EntryWorkshop,
            Some(WorkshopTrack::Cloud),
            None,
            &["fresh@college.edu", "Taken@College.edu"],
        ))
        .await
        .unwrap_err();

    match err {
        RegistrationError::DuplicateEmail(emails) => {
            assert_eq!(emails, vec!["taken@college.edu".to_string()]);
        },
        other => panic!("expected DUPLICATE_EMAIL, got {other:?}"),
    }
    assert_eq!(harness.store.registration_count().await, 1);
    assert_eq!(harness.store.member_count().await, 1);
    assert!(harness.mailer.sent().is_empty());
}

#[tokio::test]
async fn duplicate_rejection_lists_every_duplicate() {
    let harness = Harness::new();
    CommittedTeam::new("seed", 3)
        .with_emails(["a@x.edu", "b@x.edu", "c@x.edu"])
        .seed(&harness.store)
        .await;

    let err = harness
        .orchestrator
        .register(request(
            TicketCategory::EntryWorkshop,
            Some(WorkshopTrack::Ai),
            None,
            &["c@x.edu", "new@x.edu", "a@x.edu"],
        ))
        .await
        .unwrap_err();

    match err {
        RegistrationError::DuplicateEmail(emails) => {
            assert_eq!(emails, vec!["c@x.edu".to_string(), "a@x.edu".to_string()]);
        },
        other => panic!("expected DUPLICATE_EMAIL, got {other:?}"),
    }
}

#[tokio::test]
async fn startup_only_ignores_workshop_and_forces_pitch() {
    let harness = Harness::new();

    let outcome = harness
        .orchestrator
        .register(request(
            TicketCategory::StartupOnly,
            Some(WorkshopTrack::Cloud),
            Some(CompetitionTrack::Hackathon),
            &["founder@startup.io", "cto@startup.io"],
        ))
        .await
        .unwrap();

    assert_eq!(outcome.team.workshop_track, None);
    assert_eq!(outcome.team.competition_track, Some(CompetitionTrack::Pitch));
    for member in &outcome.members {
        assert_eq!(member.workshop_track, None);
        assert_eq!(member.competition_track, Some(CompetitionTrack::Pitch));
    }
    assert_eq!(
        outcome.pools_consumed,
        vec![
            PoolKey::Overall,
            PoolKey::Competition(CompetitionTrack::Pitch)
        ]
    );

    let inventory = harness.orchestrator.inventory();
    assert_eq!(
        inventory
            .occupancy(PoolKey::Workshop(WorkshopTrack::Cloud))
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        inventory
            .occupancy(PoolKey::Competition(CompetitionTrack::Pitch))
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn failed_notification_does_not_fail_registration() {
    let harness = Harness::with(
        InMemoryRegistrationStore::new(),
        RecordingMailer::failing_for(["bounce@mail.edu"]),
        AdmissionSettings::default(),
    );

    let outcome = harness
        .orchestrator
        .register(request(
            TicketCategory::EntryWorkshop,
            Some(WorkshopTrack::Cloud),
            None,
            &["ok1@mail.edu", "bounce@mail.edu", "ok2@mail.edu"],
        ))
        .await
        .unwrap();

    assert_eq!(harness.store.registration_count().await, 1);
    assert_eq!(harness.store.member_count().await, 3);
    assert_eq!(outcome.summary.total, 3);
    assert_eq!(outcome.summary.sent, 2);
    assert_eq!(outcome.summary.failed, 1);
    assert_eq!(outcome.summary.failed_emails, vec!["bounce@mail.edu".to_string()]);

    let mut delivered = harness.mailer.recipients();
    delivered.sort();
    assert_eq!(delivered, vec!["ok1@mail.edu", "ok2@mail.edu"]);
    assert_eq!(
        harness
            .store
            .registration(outcome.team.id)
            .await
            .unwrap()
            .status,
        RegistrationStatus::Pending
    );
}

#[tokio::test]
async fn partial_commit_is_reported_and_detectable() {
    let harness = Harness::new();
    harness.store.fail_member_inserts_after(1);

    let err = harness
        .orchestrator
        .register(cloud_team("partial", 3))
        .await
        .unwrap_err();

    let commit = match err {
        RegistrationError::Commit(commit) => commit,
        other => panic!("expected COMMIT_FAILED, got {other:?}"),
    };
    assert!(commit.team_written);
    assert_eq!(commit.members_written, 1);
    assert_eq!(commit.members_expected, 3);
    assert!(harness.mailer.sent().is_empty());

    let incomplete = harness.store.incomplete_registrations().await.unwrap();
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].team_id, commit.team_id);
    assert_eq!(incomplete[0].team_size, 3);
    assert_eq!(incomplete[0].members_present, 1);
}

#[tokio::test]
async fn parent_write_failure_leaves_nothing_behind() {
    let harness = Harness::new();
    harness.store.fail_registration_inserts();

    let err = harness
        .orchestrator
        .register(cloud_team("nothing", 2))
        .await
        .unwrap_err();

    match err {
        RegistrationError::Commit(commit) => {
            assert!(!commit.team_written);
            assert_eq!(commit.members_written, 0);
            assert!(!commit.is_partial());
        },
        other => panic!("expected COMMIT_FAILED, got {other:?}"),
    }
    assert_eq!(harness.store.registration_count().await, 0);
    assert_eq!(harness.store.member_count().await, 0);
}

#[tokio::test]
async fn invalid_request_never_touches_the_store() {
    let harness = Harness::new();

    let err = harness
        .orchestrator
        .register(request(
            TicketCategory::EntryCombo,
            Some(WorkshopTrack::Ai),
            None,
            &["solo@uni.edu"],
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RegistrationError::Validation(ValidationError::MissingTrack(_))
    ));
    assert!(err.is_rejection());
    assert_eq!(harness.store.occupancy_reads(), 0);
}

#[tokio::test]
async fn store_outage_is_not_a_rejection() {
    let harness = Harness::new();
    harness.store.fail_reads();

    let err = harness
        .orchestrator
        .register(cloud_team("outage", 2))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::Store(_)));
    assert!(!err.is_rejection());
}

#[tokio::test]
async fn rejected_registrations_release_their_seats() {
    let harness = Harness::new();
    fill_overall(&harness.store, 396).await;
    let withdrawn = CommittedTeam::new("withdrawn", 4)
        .tracks(
            TicketCategory::EntryCompetition,
            None,
            Some(CompetitionTrack::Hackathon),
        )
        .seed(&harness.store)
        .await;

    assert!(
        harness
            .orchestrator
            .register(cloud_team("waiting", 2))
            .await
            .is_err()
    );

    harness
        .store
        .set_status(withdrawn, RegistrationStatus::Rejected, test_clock().now())
        .await;

    harness
        .orchestrator
        .register(cloud_team("waiting", 2))
        .await
        .unwrap();
}
