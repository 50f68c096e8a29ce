//! Bills service
//!
//! High-level operations on the remote bill collection.
//! Every successful mutation fires the update notifier so that all views
//! showing bills refetch from the backend.

use crate::api::{Bill, BillApi, BillDraft, BillStatus};
use crate::error::Result;
use crate::services::UpdateNotifier;
use std::sync::Arc;

/// Service for managing bills
#[derive(Clone)]
pub struct BillsService {
    api: Arc<dyn BillApi>,
    notifier: Arc<UpdateNotifier>,
}

impl BillsService {
    pub fn new(api: Arc<dyn BillApi>, notifier: Arc<UpdateNotifier>) -> Self {
        Self { api, notifier }
    }

    pub fn notifier(&self) -> &Arc<UpdateNotifier> {
        &self.notifier
    }

    /// List bills in one status tab
    pub async fn list(&self, status: BillStatus) -> Result<Vec<Bill>> {
        self.api.list_bills(status).await
    }

    /// List every bill
    pub async fn list_all(&self) -> Result<Vec<Bill>> {
        self.api.list_all_bills().await
    }

    /// Create a new bill
    pub async fn create(&self, draft: &BillDraft) -> Result<Bill> {
        let payload = draft.to_payload()?;
        tracing::info!("Creating bill: {}", payload.name);

        let bill = self.api.create_bill(payload).await?;

        tracing::info!("Bill created successfully: {}", bill.id);
        self.notifier.trigger_update();

        Ok(bill)
    }

    /// Replace the fields of an existing bill
    pub async fn update(&self, id: &str, draft: &BillDraft) -> Result<Bill> {
        let payload = draft.to_payload()?;
        tracing::debug!("Updating bill: {}", id);

        let bill = self.api.update_bill(id, payload).await?;

        tracing::debug!("Bill updated successfully: {}", bill.id);
        self.notifier.trigger_update();

        Ok(bill)
    }

    /// Delete a bill
    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting bill: {}", id);

        self.api.delete_bill(id).await?;

        tracing::info!("Bill deleted successfully: {}", id);
        self.notifier.trigger_update();

        Ok(())
    }

    /// Mark a bill as paid
    pub async fn mark_paid(&self, id: &str) -> Result<Bill> {
        tracing::info!("Marking bill as paid: {}", id);

        let bill = self.api.mark_bill_paid(id).await?;
        self.notifier.trigger_update();

        Ok(bill)
    }
}
