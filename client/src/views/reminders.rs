//! Reminder list view
//!
//! Shows reminders next to the upcoming bills they refer to. Bills are
//! joined by id through an index rebuilt on every bill refresh; a reminder
//! whose bill is gone renders with a placeholder.

use super::boundary;
use crate::api::{Bill, BillStatus, Reminder, ReminderDraft};
use crate::config::DEFAULT_DAYS_BEFORE;
use crate::error::AppError;
use crate::services::export::format_date;
use crate::services::{BillsService, RemindersService, SharedToasts, Toast};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Label used when a reminder's bill is not loaded
pub const MISSING_BILL_LABEL: &str = "Bill";

/// A reminder joined with whatever is known about its bill
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderEntry {
    pub reminder: Reminder,
    pub bill_name: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl ReminderEntry {
    pub fn title(&self) -> String {
        format!(
            "Reminder for {}",
            self.bill_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(MISSING_BILL_LABEL)
        )
    }

    pub fn detail(&self, date_format: &str) -> String {
        let email = if self.reminder.send_email {
            format!("Email: {}", self.reminder.email)
        } else {
            "No email notification".to_string()
        };
        let due = self
            .due_date
            .map(|date| format_date(date, date_format))
            .unwrap_or_else(|| "N/A".to_string());

        format!(
            "{} days before due date | {} | Due: {}",
            self.reminder.days_before, email, due
        )
    }
}

#[derive(Debug, Default)]
struct ReminderState {
    reminders: Vec<Reminder>,
    bills: Vec<Bill>,
    index: HashMap<String, usize>,
    selected_bill: Option<String>,
}

impl ReminderState {
    fn set_bills(&mut self, bills: Vec<Bill>) {
        self.index = bills
            .iter()
            .enumerate()
            .map(|(pos, bill)| (bill.id.clone(), pos))
            .collect();
        self.bills = bills;

        let selection_valid = self
            .selected_bill
            .as_ref()
            .is_some_and(|id| self.index.contains_key(id));
        if !selection_valid {
            self.selected_bill = self.bills.first().map(|bill| bill.id.clone());
        }
    }

    fn bill(&self, id: &str) -> Option<&Bill> {
        self.index.get(id).and_then(|&pos| self.bills.get(pos))
    }
}

/// Reminders screen
#[derive(Clone)]
pub struct ReminderListView {
    reminders: RemindersService,
    bills: BillsService,
    toasts: SharedToasts,
    date_format: String,
    state: Arc<RwLock<ReminderState>>,
}

impl ReminderListView {
    pub fn new(
        reminders: RemindersService,
        bills: BillsService,
        toasts: SharedToasts,
        date_format: impl Into<String>,
    ) -> Self {
        Self {
            reminders,
            bills,
            toasts,
            date_format: date_format.into(),
            state: Arc::new(RwLock::new(ReminderState::default())),
        }
    }

    /// Initial load of reminders and the bills they can refer to
    pub async fn load(&self) {
        self.refresh_reminders().await;
        self.refresh_bills().await;
    }

    pub async fn refresh_reminders(&self) -> bool {
        match self.reminders.list().await {
            Ok(reminders) => {
                tracing::debug!("Loaded {} reminders", reminders.len());
                self.state.write().await.reminders = reminders;
                true
            }
            Err(e) => {
                tracing::error!("Failed to fetch reminders: {}", e);
                self.toasts.show(Toast::error("Failed to fetch reminders"));
                false
            }
        }
    }

    /// Reload upcoming bills and rebuild the id index
    pub async fn refresh_bills(&self) -> bool {
        match self.bills.list(BillStatus::Upcoming).await {
            Ok(bills) => {
                self.state.write().await.set_bills(bills);
                true
            }
            Err(e) => {
                tracing::error!("Failed to fetch upcoming bills: {}", e);
                self.toasts
                    .show(Toast::error("Failed to fetch upcoming bills"));
                false
            }
        }
    }

    /// Rebuild the bill index whenever bills change elsewhere
    pub fn watch_updates(&self) -> JoinHandle<()> {
        let view = self.clone();
        let mut updates = self.bills.notifier().subscribe();

        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                view.refresh_bills().await;
            }
        })
    }

    /// Bills selectable in the reminder form
    pub async fn bill_choices(&self) -> Vec<Bill> {
        self.state.read().await.bills.clone()
    }

    pub async fn selected_bill(&self) -> Option<String> {
        self.state.read().await.selected_bill.clone()
    }

    pub async fn select_bill(&self, bill_id: impl Into<String>) {
        self.state.write().await.selected_bill = Some(bill_id.into());
    }

    /// Days-before value a fresh form starts with
    pub fn default_days_before(&self) -> u32 {
        DEFAULT_DAYS_BEFORE
    }

    fn report(&self, action: &str, error: &AppError) {
        if error.is_validation() {
            self.toasts.show(Toast::warning(error.user_message()));
            return;
        }
        tracing::error!("Failed to {}: {}", action, error);
        self.toasts.show(Toast::error(format!(
            "Failed to {}: {}",
            action,
            error.user_message()
        )));
    }

    /// Create a reminder for the selected bill
    pub async fn create(&self, days_before: u32, email: &str, send_email: bool) -> Option<Reminder> {
        let bill_id = self.selected_bill().await.unwrap_or_default();
        let draft = ReminderDraft::new(bill_id, days_before, email, send_email);

        match self.reminders.create_from_draft(&draft).await {
            Ok(reminder) => {
                self.toasts
                    .show(Toast::success("Reminder created successfully!"));
                self.refresh_reminders().await;
                Some(reminder)
            }
            Err(e) => {
                self.report("create reminder", &e);
                None
            }
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        match self.reminders.delete(id).await {
            Ok(()) => {
                self.toasts
                    .show(Toast::success("Reminder deleted successfully!"));
                self.refresh_reminders().await;
                true
            }
            Err(e) => {
                self.report("delete reminder", &e);
                false
            }
        }
    }

    /// Reminders joined against the loaded bills
    pub async fn entries(&self) -> Vec<ReminderEntry> {
        let state = self.state.read().await;
        state
            .reminders
            .iter()
            .map(|reminder| {
                let bill = state.bill(&reminder.bill_id);
                ReminderEntry {
                    reminder: reminder.clone(),
                    bill_name: bill.map(|b| b.name.clone()),
                    due_date: bill.map(|b| b.due_date),
                }
            })
            .collect()
    }

    pub async fn render(&self) -> String {
        let entries = self.entries().await;
        let date_format = self.date_format.clone();

        boundary::guard(move || {
            if entries.is_empty() {
                return "No reminders set\n".to_string();
            }
            entries
                .iter()
                .map(|entry| format!("{}\n  {}\n", entry.title(), entry.detail(&date_format)))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BillDraft, InMemoryApi};
    use crate::config::DEFAULT_DATE_FORMAT;
    use crate::services::{ChannelToasts, ToastLevel, UpdateNotifier};
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn create_test_view() -> (ReminderListView, BillsService, InMemoryApi, UnboundedReceiver<Toast>) {
        let api = InMemoryApi::new();
        api.set_today(date("2024-02-15")).await;
        let bills = BillsService::new(Arc::new(api.clone()), Arc::new(UpdateNotifier::new()));
        let reminders = RemindersService::new(Arc::new(api.clone()));
        let (toasts, rx) = ChannelToasts::new();
        let view = ReminderListView::new(reminders, bills.clone(), Arc::new(toasts), DEFAULT_DATE_FORMAT);
        (view, bills, api, rx)
    }

    #[tokio::test]
    async fn test_first_upcoming_bill_is_preselected() {
        let (view, bills, _api, _rx) = create_test_view().await;
        let rent = bills
            .create(&BillDraft::new("Rent", 1200.0, date("2024-03-01")))
            .await
            .unwrap();
        bills
            .create(&BillDraft::new("Water", 40.0, date("2024-03-10")))
            .await
            .unwrap();

        view.load().await;

        assert_eq!(view.selected_bill().await, Some(rent.id));
        assert_eq!(view.bill_choices().await.len(), 2);
    }

    #[tokio::test]
    async fn test_create_reminder_for_selected_bill() {
        let (view, bills, _api, mut rx) = create_test_view().await;
        let rent = bills
            .create(&BillDraft::new("Rent", 1200.0, date("2024-03-01")))
            .await
            .unwrap();
        view.load().await;

        let reminder = view.create(5, "me@example.com", true).await.unwrap();
        assert_eq!(reminder.bill_id, rent.id);

        let entries = view.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title(), "Reminder for Rent");
        assert_eq!(
            entries[0].detail(DEFAULT_DATE_FORMAT),
            "5 days before due date | Email: me@example.com | Due: 3/1/2024"
        );
        assert_eq!(rx.try_recv().unwrap().message, "Reminder created successfully!");
    }

    #[tokio::test]
    async fn test_missing_email_warns_without_request() {
        let (view, bills, api, mut rx) = create_test_view().await;
        bills
            .create(&BillDraft::new("Rent", 1200.0, date("2024-03-01")))
            .await
            .unwrap();
        view.load().await;
        let before = api.request_count();

        assert!(view.create(3, "", true).await.is_none());

        assert_eq!(api.request_count(), before);
        let toast = rx.try_recv().unwrap();
        assert_eq!(toast.level, ToastLevel::Warning);
        assert_eq!(toast.message, "Please enter an email address");
    }

    #[tokio::test]
    async fn test_no_bill_selected_warns() {
        let (view, _bills, api, mut rx) = create_test_view().await;
        view.load().await;
        let before = api.request_count();

        assert!(view.create(3, "", false).await.is_none());

        assert_eq!(api.request_count(), before);
        assert_eq!(rx.try_recv().unwrap().message, "Please select a bill");
    }

    #[tokio::test]
    async fn test_reminder_for_deleted_bill_uses_placeholder() {
        let (view, bills, _api, _rx) = create_test_view().await;
        let gym = bills
            .create(&BillDraft::new("Gym", 30.0, date("2024-03-01")))
            .await
            .unwrap();
        view.load().await;
        view.create(2, "", false).await.unwrap();

        bills.delete(&gym.id).await.unwrap();
        view.refresh_bills().await;

        let entries = view.entries().await;
        assert_eq!(entries[0].title(), "Reminder for Bill");
        assert_eq!(
            entries[0].detail(DEFAULT_DATE_FORMAT),
            "2 days before due date | No email notification | Due: N/A"
        );
        let rendered = view.render().await;
        assert!(rendered.contains("Reminder for Bill"));
        assert_eq!(view.selected_bill().await, None);
    }

    #[test]
    fn test_unnamed_bill_uses_placeholder() {
        let entry = ReminderEntry {
            reminder: Reminder {
                id: "r1".to_string(),
                bill_id: "b1".to_string(),
                days_before: 3,
                send_email: false,
                email: String::new(),
            },
            bill_name: Some(String::new()),
            due_date: Some(date("2024-03-01")),
        };
        assert_eq!(entry.title(), "Reminder for Bill");

        let named = ReminderEntry {
            bill_name: Some("Rent".to_string()),
            ..entry
        };
        assert_eq!(named.title(), "Reminder for Rent");
    }

    #[tokio::test]
    async fn test_index_follows_bill_updates() {
        let (view, bills, _api, _rx) = create_test_view().await;
        view.load().await;
        let handle = view.watch_updates();

        bills
            .create(&BillDraft::new("Insurance", 300.0, date("2024-04-01")))
            .await
            .unwrap();

        for _ in 0..50 {
            if !view.bill_choices().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(view.bill_choices().await.len(), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_failed_fetch_shows_toasts() {
        let (view, _bills, api, mut rx) = create_test_view().await;
        api.set_offline(true).await;

        view.load().await;

        assert_eq!(rx.try_recv().unwrap().message, "Failed to fetch reminders");
        assert_eq!(rx.try_recv().unwrap().message, "Failed to fetch upcoming bills");
        assert_eq!(view.render().await, "No reminders set\n");
    }
}
