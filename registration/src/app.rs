//! Application assembly.
//!
//! Wires a [`Config`] and a registration store into the shared [`AppState`]:
//! mail transport, renderer, dispatcher, orchestrator and session verifier.
//!
//! ```rust,ignore
//! let store = Arc::new(PostgresRegistrationStore::connect(&config.postgres.url, &config.pool_settings()).await?);
//! let state = build_state(&config, store)?;
//! let router = build_router(state);
//! ```

use crate::auth::StaticTokenVerifier;
use crate::config::{Config, MailConfig, MailTransport};
use crate::notify::{
    ConfirmationRenderer, ConsoleMailer, NotificationDispatcher, SmtpMailer, SmtpSettings,
};
use crate::orchestrator::RegistrationOrchestrator;
use crate::server::AppState;
use fest_admission_core::notify::{Mailer, MailError};
use fest_admission_core::store::RegistrationStore;
use std::sync::Arc;

impl From<&MailConfig> for SmtpSettings {
    fn from(mail: &MailConfig) -> Self {
        Self {
            host: mail.smtp_host.clone(),
            port: mail.smtp_port,
            username: mail.smtp_username.clone(),
            password: mail.smtp_password.clone(),
            from_address: mail.from_address.clone(),
            from_name: mail.from_name.clone(),
        }
    }
}

/// Build the configured mail transport.
///
/// # Errors
///
/// Returns [`MailError`] if the SMTP relay cannot be configured.
pub fn build_mailer(mail: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match mail.transport {
        MailTransport::Console => Ok(Arc::new(ConsoleMailer::new())),
        MailTransport::Smtp => {
            tracing::info!(host = %mail.smtp_host, port = mail.smtp_port, "Using SMTP mail transport");
            Ok(Arc::new(SmtpMailer::new(SmtpSettings::from(mail))?))
        },
    }
}

/// Assemble application state over `store`.
///
/// # Errors
///
/// Returns an error if the mail transport cannot be built.
pub fn build_state(config: &Config, store: Arc<dyn RegistrationStore>) -> anyhow::Result<AppState> {
    let mailer = build_mailer(&config.mail)?;
    let renderer = Arc::new(ConfirmationRenderer::new(
        config.mail.event_name.clone(),
        config.mail.dashboard_url.clone(),
    ));
    let dispatcher = NotificationDispatcher::new(renderer, mailer, config.send_timeout());

    let orchestrator = Arc::new(RegistrationOrchestrator::new(
        Arc::clone(&store),
        dispatcher,
        config.admission_settings(),
    ));

    if config.auth.admin_api_token.is_none() {
        tracing::warn!("ADMIN_API_TOKEN not set; authenticated endpoints will refuse every request");
    }
    let verifier = Arc::new(StaticTokenVerifier::new(config.auth.admin_api_token.clone()));

    Ok(AppState::new(orchestrator, store, verifier))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fest_admission_testing::InMemoryRegistrationStore;

    fn config(vars: &'static [(&'static str, &'static str)]) -> Config {
        Config::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        })
    }

    #[test]
    fn state_carries_configured_admission_settings() {
        let config = config(&[("MAX_OVERALL", "50"), ("ADMISSION_MODE", "concurrent")]);
        let state = build_state(&config, Arc::new(InMemoryRegistrationStore::new())).unwrap();

        assert_eq!(state.orchestrator.settings().capacities.overall, 50);
        assert_eq!(
            state.orchestrator.settings().mode,
            crate::admission::AdmissionMode::Concurrent
        );
    }

    #[test]
    fn smtp_with_bad_sender_is_rejected() {
        let config = config(&[
            ("MAIL_TRANSPORT", "smtp"),
            ("MAIL_FROM_ADDRESS", "not an address"),
        ]);
        assert!(matches!(
            build_mailer(&config.mail),
            Err(MailError::InvalidAddress(_))
        ));
    }
}
