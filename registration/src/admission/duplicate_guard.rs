//! Duplicate guard.

use fest_admission_core::store::{RegistrationStore, StoreError};
use std::sync::Arc;

/// Result of a duplicate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    /// No proposed email is registered yet.
    Clear,
    /// Every proposed email that already belongs to a member, in request order.
    Duplicates(Vec<String>),
}

/// Rejects a team when any of its emails is already registered.
#[derive(Clone)]
pub struct DuplicateGuard {
    store: Arc<dyn RegistrationStore>,
}

impl DuplicateGuard {
    /// Create a guard over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    /// Check normalized `emails` against committed members.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup fails.
    pub async fn check(&self, emails: &[String]) -> Result<GuardVerdict, StoreError> {
        let existing = self.store.existing_emails(emails).await?;
        if existing.is_empty() {
            return Ok(GuardVerdict::Clear);
        }

        tracing::info!(duplicates = ?existing, "Duplicate emails in registration");
        Ok(GuardVerdict::Duplicates(existing))
    }
}
