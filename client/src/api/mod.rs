//! Backend API module
//!
//! This module provides everything needed to talk to the bills backend:
//! - Model definitions
//! - The [`BillApi`] / [`ReminderApi`] seams used by the services
//! - A reqwest implementation and an in-process implementation

pub mod http;
pub mod memory;
pub mod models;

pub use http::HttpApi;
pub use memory::InMemoryApi;
pub use models::*;

use crate::error::Result;
use async_trait::async_trait;

/// Remote bill collection
#[async_trait]
pub trait BillApi: Send + Sync {
    /// Bills in the given status tab
    async fn list_bills(&self, status: BillStatus) -> Result<Vec<Bill>>;

    /// Every bill regardless of status
    async fn list_all_bills(&self) -> Result<Vec<Bill>>;

    async fn create_bill(&self, payload: BillPayload<'_>) -> Result<Bill>;

    async fn update_bill(&self, id: &str, payload: BillPayload<'_>) -> Result<Bill>;

    async fn delete_bill(&self, id: &str) -> Result<()>;

    async fn mark_bill_paid(&self, id: &str) -> Result<Bill>;
}

/// Remote reminder collection
#[async_trait]
pub trait ReminderApi: Send + Sync {
    async fn list_reminders(&self) -> Result<Vec<Reminder>>;

    async fn create_reminder(&self, payload: ReminderPayload<'_>) -> Result<Reminder>;

    async fn delete_reminder(&self, id: &str) -> Result<()>;
}
