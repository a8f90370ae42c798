//! Recording mailer.

use fest_admission_core::notify::{MailError, Mailer, OutgoingMessage};
use fest_admission_core::store::BoxFuture;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// Mailer that records every delivered message and fails for chosen recipients.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMessage>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
}

impl RecordingMailer {
    /// Mailer that delivers everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mailer that fails every send addressed to one of `emails`.
    #[must_use]
    pub fn failing_for<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing: emails.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sleep before every send.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Messages delivered so far.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Recipients delivered so far.
    #[must_use]
    pub fn recipients(&self) -> Vec<String> {
        self.sent().into_iter().map(|message| message.to).collect()
    }
}

impl Mailer for RecordingMailer {
    #[allow(clippy::unwrap_used)]
    fn send<'a>(&'a self, message: &'a OutgoingMessage) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.contains(&message.to) {
                return Err(MailError::Transport(format!(
                    "simulated delivery failure for {}",
                    message.to
                )));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        })
    }
}
