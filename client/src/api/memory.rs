//! In-process backend
//!
//! Implements the same contract as the REST backend on top of in-memory
//! collections: ids are generated server-side, status is derived from the
//! due date, listings come back ordered by due date. Used for offline runs
//! and as the backend of the test suites.

use super::models::*;
use super::{BillApi, ReminderApi};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Collections {
    bills: Vec<Bill>,
    reminders: Vec<Reminder>,
    today: Option<NaiveDate>,
    offline: bool,
    list_delays: HashMap<BillStatus, Duration>,
}

/// In-memory bills backend
#[derive(Clone, Default)]
pub struct InMemoryApi {
    state: Arc<Mutex<Collections>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin "today" so status derivation is deterministic
    pub async fn set_today(&self, today: NaiveDate) {
        self.state.lock().await.today = Some(today);
    }

    /// Make every request fail as if the backend were down
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Delay responses for one status tab
    pub async fn set_list_delay(&self, status: BillStatus, delay: Duration) {
        self.state.lock().await.list_delays.insert(status, delay);
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Insert a bill directly, bypassing validation
    pub async fn seed_bill(&self, bill: Bill) {
        self.state.lock().await.bills.push(bill);
    }

    async fn begin(&self) -> Result<tokio::sync::MutexGuard<'_, Collections>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        if state.offline {
            return Err(AppError::Server {
                status: 503,
                message: Some("Backend unavailable".to_string()),
            });
        }
        Ok(state)
    }

    fn today(state: &Collections) -> NaiveDate {
        state.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

fn sorted_by_due_date(mut bills: Vec<Bill>) -> Vec<Bill> {
    bills.sort_by_key(|bill| bill.due_date);
    bills
}

#[async_trait]
impl BillApi for InMemoryApi {
    async fn list_bills(&self, status: BillStatus) -> Result<Vec<Bill>> {
        let (bills, delay) = {
            let state = self.begin().await?;
            let today = Self::today(&state);
            let bills: Vec<Bill> = state
                .bills
                .iter()
                .filter(|bill| bill.status_on(today) == status)
                .cloned()
                .collect();
            (bills, state.list_delays.get(&status).copied())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(sorted_by_due_date(bills))
    }

    async fn list_all_bills(&self) -> Result<Vec<Bill>> {
        let state = self.begin().await?;
        Ok(sorted_by_due_date(state.bills.clone()))
    }

    async fn create_bill(&self, payload: BillPayload<'_>) -> Result<Bill> {
        let mut state = self.begin().await?;
        let bill = payload.into_bill(Uuid::new_v4().to_string());
        state.bills.push(bill.clone());
        Ok(bill)
    }

    async fn update_bill(&self, id: &str, payload: BillPayload<'_>) -> Result<Bill> {
        let mut state = self.begin().await?;
        let bill = state
            .bills
            .iter_mut()
            .find(|bill| bill.id == id)
            .ok_or_else(|| AppError::not_found(id))?;

        let paid = bill.paid;
        *bill = payload.into_bill(id.to_string());
        bill.paid = paid;
        Ok(bill.clone())
    }

    async fn delete_bill(&self, id: &str) -> Result<()> {
        let mut state = self.begin().await?;
        let before = state.bills.len();
        state.bills.retain(|bill| bill.id != id);
        if state.bills.len() == before {
            return Err(AppError::not_found(id));
        }
        Ok(())
    }

    async fn mark_bill_paid(&self, id: &str) -> Result<Bill> {
        let mut state = self.begin().await?;
        let bill = state
            .bills
            .iter_mut()
            .find(|bill| bill.id == id)
            .ok_or_else(|| AppError::not_found(id))?;
        bill.paid = true;
        Ok(bill.clone())
    }
}

#[async_trait]
impl ReminderApi for InMemoryApi {
    async fn list_reminders(&self) -> Result<Vec<Reminder>> {
        let state = self.begin().await?;
        Ok(state.reminders.clone())
    }

    async fn create_reminder(&self, payload: ReminderPayload<'_>) -> Result<Reminder> {
        let mut state = self.begin().await?;
        let reminder = payload.into_reminder(Uuid::new_v4().to_string());
        state.reminders.push(reminder.clone());
        Ok(reminder)
    }

    async fn delete_reminder(&self, id: &str) -> Result<()> {
        let mut state = self.begin().await?;
        let before = state.reminders.len();
        state.reminders.retain(|reminder| reminder.id != id);
        if state.reminders.len() == before {
            return Err(AppError::not_found(id));
        }
        Ok(())
    }
}
