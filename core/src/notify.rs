//! Outbound confirmation messages.
//!
//! Rendering and transport are black boxes to admission: a [`MessageRenderer`] turns
//! [`ConfirmationData`] into an [`OutgoingMessage`], and a [`Mailer`] delivers it.

use crate::category::{CompetitionTrack, TicketCategory, WorkshopTrack};
use crate::store::BoxFuture;
use crate::types::TeamId;
use thiserror::Error;

/// Everything a confirmation message may mention about one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationData {
    /// Recipient name
    pub member_name: String,
    /// Recipient email
    pub email: String,
    /// Team identifier
    pub team_id: TeamId,
    /// Organization name
    pub organization: String,
    /// Ticket category
    pub category: TicketCategory,
    /// Member's workshop
    pub workshop_track: Option<WorkshopTrack>,
    /// Member's competition
    pub competition_track: Option<CompetitionTrack>,
    /// Plaintext dashboard passkey; never stored
    pub passkey: String,
}

/// A rendered message ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html_body: String,
    /// Plain-text body
    pub text_body: String,
}

/// Message rendering.
pub trait MessageRenderer: Send + Sync {
    /// Render the confirmation for one member.
    fn render(&self, data: &ConfirmationData) -> OutgoingMessage;
}

/// Delivery failure for one message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MailError {
    /// Recipient address was rejected before sending.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Transport accepted the call but delivery failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Send did not finish in time.
    #[error("send timed out after {0}s")]
    Timeout(u64),
}

/// Message transport.
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] if the message could not be delivered.
    fn send<'a>(&'a self, message: &'a OutgoingMessage) -> BoxFuture<'a, Result<(), MailError>>;
}
