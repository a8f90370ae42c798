//! Console mailer for development.

use fest_admission_core::notify::{MailError, Mailer, OutgoingMessage};
use fest_admission_core::store::BoxFuture;
use tracing::info;

/// Mailer that logs messages instead of sending them.
///
/// Useful for development where you don't want to send real emails. The plaintext
/// body, passkey included, goes to the log.
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    /// Create a console mailer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Mailer for ConsoleMailer {
    fn send<'a>(&'a self, message: &'a OutgoingMessage) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            info!(
                to = %message.to,
                subject = %message.subject,
                body = %message.text_body,
                "📧 Confirmation email (development mode)"
            );
            Ok(())
        })
    }
}
