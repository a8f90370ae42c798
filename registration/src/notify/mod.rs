//! Confirmation notifications.
//!
//! The dispatcher sends one message per committed member. Sends run concurrently,
//! each under its own timeout, and a failure is recorded against that member only.
//! Nothing here can fail a registration: by the time it runs the team is committed.

use crate::committer::CommittedTeam;
use crate::metrics;
use fest_admission_core::notify::{ConfirmationData, MailError, Mailer, MessageRenderer};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub mod console;
pub mod render;
pub mod smtp;

pub use console::ConsoleMailer;
pub use render::ConfirmationRenderer;
pub use smtp::{SmtpMailer, SmtpSettings};

/// Delivery outcome for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Message handed to the transport
    Sent,
    /// Delivery failed
    Failed {
        /// Failure detail
        error: String,
    },
}

/// Notification result for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberNotificationResult {
    /// Recipient
    pub email: String,
    /// Outcome
    #[serde(flatten)]
    pub status: NotificationStatus,
}

impl MemberNotificationResult {
    /// Whether the message was sent.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self.status, NotificationStatus::Sent)
    }
}

/// Aggregate notification outcome reported with a registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationSummary {
    /// Messages attempted
    pub total: usize,
    /// Messages sent
    pub sent: usize,
    /// Messages that failed
    pub failed: usize,
    /// Recipients whose message failed
    pub failed_emails: Vec<String>,
}

impl NotificationSummary {
    /// Summarize per-member results.
    #[must_use]
    pub fn from_results(results: &[MemberNotificationResult]) -> Self {
        let failed_emails: Vec<String> = results
            .iter()
            .filter(|result| !result.is_sent())
            .map(|result| result.email.clone())
            .collect();
        Self {
            total: results.len(),
            sent: results.len() - failed_emails.len(),
            failed: failed_emails.len(),
            failed_emails,
        }
    }
}

/// Renders and sends confirmation messages.
#[derive(Clone)]
pub struct NotificationDispatcher {
    renderer: Arc<dyn MessageRenderer>,
    mailer: Arc<dyn Mailer>,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    /// Create a dispatcher.
    #[must_use]
    pub fn new(
        renderer: Arc<dyn MessageRenderer>,
        mailer: Arc<dyn Mailer>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            mailer,
            send_timeout,
        }
    }

    async fn send_one(&self, data: ConfirmationData) -> MemberNotificationResult {
        let message = self.renderer.render(&data);
        let outcome = tokio::time::timeout(self.send_timeout, self.mailer.send(&message))
            .await
            .unwrap_or(Err(MailError::Timeout(self.send_timeout.as_secs())));

        match outcome {
            Ok(()) => {
                metrics::record_notification(true);
                MemberNotificationResult {
                    email: data.email,
                    status: NotificationStatus::Sent,
                }
            },
            Err(error) => {
                tracing::warn!(
                    team_id = %data.team_id,
                    email = %data.email,
                    error = %error,
                    "Confirmation message failed"
                );
                metrics::record_notification(false);
                MemberNotificationResult {
                    email: data.email,
                    status: NotificationStatus::Failed {
                        error: error.to_string(),
                    },
                }
            },
        }
    }

    /// Send one confirmation per member of `committed`.
    ///
    /// Returns one result per member, in member order.
    pub async fn notify(&self, committed: &CommittedTeam) -> Vec<MemberNotificationResult> {
        let team = &committed.team;
        let sends = committed.members.iter().map(|member| {
            self.send_one(ConfirmationData {
                member_name: member.record.name.clone(),
                email: member.record.email.clone(),
                team_id: team.id,
                organization: team.organization.clone(),
                category: team.category,
                workshop_track: member.record.workshop_track,
                competition_track: member.record.competition_track,
                passkey: member.passkey.clone(),
            })
        });
        join_all(sends).await
    }
}
