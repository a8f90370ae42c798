//! SMTP mailer using Lettre.

use fest_admission_core::notify::{MailError, Mailer, OutgoingMessage};
use fest_admission_core::store::BoxFuture;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// SMTP connection settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// SMTP server address (e.g. "smtp.gmail.com")
    pub host: String,
    /// SMTP server port (usually 587 for STARTTLS)
    pub port: u16,
    /// Authentication username
    pub username: String,
    /// Authentication password
    pub password: String,
    /// Sender address
    pub from_address: String,
    /// Sender display name
    pub from_name: String,
}

/// Mailer that delivers through an SMTP relay with STARTTLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create an SMTP mailer.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::InvalidAddress`] for a bad sender address and
    /// [`MailError::Transport`] if the relay cannot be configured.
    pub fn new(settings: SmtpSettings) -> Result<Self, MailError> {
        let from: Mailbox = format!("{} <{}>", settings.from_name, settings.from_address)
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("Invalid from address: {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?
            .port(settings.port)
            .credentials(Credentials::new(settings.username, settings.password))
            .build();

        Ok(Self { transport, from })
    }

    fn build_message(&self, message: &OutgoingMessage) -> Result<Message, MailError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("Invalid to address: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))
            .map_err(|e| MailError::Transport(format!("Failed to build email: {e}")))
    }
}

impl Mailer for SmtpMailer {
    fn send<'a>(&'a self, message: &'a OutgoingMessage) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let email = self.build_message(message)?;
            self.transport
                .send(email)
                .await
                .map_err(|e| MailError::Transport(format!("Failed to send email: {e}")))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(from_address: &str) -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "user".to_string(),
            password: "secret".to_string(),
            from_address: from_address.to_string(),
            from_name: "TechFest".to_string(),
        }
    }

    #[test]
    fn rejects_bad_sender() {
        assert!(matches!(
            SmtpMailer::new(settings("not an address")),
            Err(MailError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn rejects_bad_recipient_before_connecting() {
        let Ok(mailer) = SmtpMailer::new(settings("noreply@example.com")) else {
            return;
        };
        let message = OutgoingMessage {
            to: "nobody".to_string(),
            subject: "s".to_string(),
            html_body: String::new(),
            text_body: String::new(),
        };

        assert!(matches!(
            mailer.send(&message).await,
            Err(MailError::InvalidAddress(_))
        ));
    }
}
