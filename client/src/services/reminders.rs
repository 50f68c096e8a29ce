//! Reminders service
//!
//! CRUD against the remote reminder collection. Reminders point at bills by
//! id only; the bill may be gone by the time a reminder is shown.

use crate::api::{Reminder, ReminderApi, ReminderDraft};
use crate::error::Result;
use std::sync::Arc;

/// Service for managing reminders
#[derive(Clone)]
pub struct RemindersService {
    api: Arc<dyn ReminderApi>,
}

impl RemindersService {
    pub fn new(api: Arc<dyn ReminderApi>) -> Self {
        Self { api }
    }

    /// List all reminders
    pub async fn list(&self) -> Result<Vec<Reminder>> {
        self.api.list_reminders().await
    }

    /// Create a reminder for a bill.
    ///
    /// Validation happens before any request is made.
    pub async fn create(
        &self,
        bill_id: &str,
        days_before: u32,
        email: &str,
        send_email: bool,
    ) -> Result<Reminder> {
        let draft = ReminderDraft::new(bill_id, days_before, email, send_email);
        self.create_from_draft(&draft).await
    }

    pub async fn create_from_draft(&self, draft: &ReminderDraft) -> Result<Reminder> {
        let payload = draft.to_payload()?;
        tracing::info!(
            "Creating reminder for bill {} ({} days before)",
            payload.bill_id,
            payload.days_before
        );

        let reminder = self.api.create_reminder(payload).await?;

        tracing::info!("Reminder created successfully: {}", reminder.id);
        Ok(reminder)
    }

    /// Delete a reminder
    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting reminder: {}", id);
        self.api.delete_reminder(id).await
    }
}
