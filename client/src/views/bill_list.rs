//! Bill list view
//!
//! Per-screen state of the bill list: selected status tab, search term, sort
//! field and the cached bills of the current tab. All backend failures are
//! caught here and shown as toasts; the previous list stays on screen.

use super::boundary;
use super::projection::project;
use crate::api::{Bill, BillDraft, BillStatus, SortField};
use crate::error::AppError;
use crate::services::export::{self, format_date};
use crate::services::{BillsService, SharedToasts, Toast};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct ListState {
    tab: BillStatus,
    search: String,
    sort: SortField,
    bills: Vec<Bill>,
    loading: bool,
    /// Ticket of the newest response applied to `bills`
    applied: u64,
}

/// Bill list screen
#[derive(Clone)]
pub struct BillListView {
    service: BillsService,
    toasts: SharedToasts,
    date_format: String,
    state: Arc<RwLock<ListState>>,
    tickets: Arc<AtomicU64>,
}

impl BillListView {
    pub fn new(service: BillsService, toasts: SharedToasts, date_format: impl Into<String>) -> Self {
        Self {
            service,
            toasts,
            date_format: date_format.into(),
            state: Arc::new(RwLock::new(ListState::default())),
            tickets: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn tab(&self) -> BillStatus {
        self.state.read().await.tab
    }

    /// Switch status tab and fetch its bills
    pub async fn set_tab(&self, tab: BillStatus) {
        self.state.write().await.tab = tab;
        self.refresh().await;
    }

    pub async fn set_search(&self, term: impl Into<String>) {
        self.state.write().await.search = term.into();
    }

    pub async fn set_sort(&self, sort: SortField) {
        self.state.write().await.sort = sort;
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Cached bills of the current tab, in backend order
    pub async fn bills(&self) -> Vec<Bill> {
        self.state.read().await.bills.clone()
    }

    /// Bills as displayed: sorted and filtered
    pub async fn visible(&self) -> Vec<Bill> {
        let state = self.state.read().await;
        project(&state.bills, &state.search, state.sort)
    }

    /// Refetch the current tab.
    ///
    /// Returns whether the response was applied. A response older than one
    /// already applied is dropped, so overlapping refreshes cannot leave a
    /// stale list on screen.
    pub async fn refresh(&self) -> bool {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let tab = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.tab
        };

        let result = self.service.list(tab).await;

        let mut state = self.state.write().await;
        if ticket == self.tickets.load(Ordering::SeqCst) {
            state.loading = false;
        }

        if ticket < state.applied {
            tracing::debug!("Dropping stale {} response (ticket {})", tab, ticket);
            return false;
        }

        match result {
            Ok(bills) => {
                tracing::debug!("Loaded {} {} bills", bills.len(), tab);
                state.bills = bills;
                state.applied = ticket;
                true
            }
            Err(e) => {
                tracing::error!("Failed to fetch bills: {}", e);
                self.toasts.show(Toast::error("Failed to fetch bills"));
                false
            }
        }
    }

    /// Refetch whenever the update notifier fires
    pub fn watch_updates(&self) -> JoinHandle<()> {
        let view = self.clone();
        let mut updates = self.service.notifier().subscribe();

        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                view.refresh().await;
            }
        })
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

    pub async fn add_bill(&self, draft: &BillDraft) -> Option<Bill> {
        match self.service.create(draft).await {
            Ok(bill) => {
                self.toasts.show(Toast::success("Bill added successfully!"));
                self.refresh().await;
                Some(bill)
            }
            Err(e) => {
                self.report("add bill", &e);
                None
            }
        }
    }

    pub async fn update_bill(&self, id: &str, draft: &BillDraft) -> Option<Bill> {
        match self.service.update(id, draft).await {
            Ok(bill) => {
                self.toasts.show(Toast::success("Bill updated successfully!"));
                self.refresh().await;
                Some(bill)
            }
            Err(e) => {
                self.report("update bill", &e);
                None
            }
        }
    }

    pub async fn delete_bill(&self, id: &str) -> bool {
        match self.service.delete(id).await {
            Ok(()) => {
                self.toasts.show(Toast::success("Bill deleted successfully!"));
                self.refresh().await;
                true
            }
            Err(e) => {
                self.report("delete bill", &e);
                false
            }
        }
    }

    pub async fn mark_paid(&self, id: &str) -> Option<Bill> {
        match self.service.mark_paid(id).await {
            Ok(bill) => {
                self.toasts.show(Toast::success("Bill marked as paid!"));
                self.refresh().await;
                Some(bill)
            }
            Err(e) => {
                self.report("mark bill as paid", &e);
                None
            }
        }
    }

    /// Submit the bill form: update when editing, create otherwise
    pub async fn submit(&self, editing: Option<&Bill>, draft: &BillDraft) -> Option<Bill> {
        match editing {
            Some(bill) => self.update_bill(&bill.id, draft).await,
            None => self.add_bill(draft).await,
        }
    }

    /// CSV of the displayed bills
    pub async fn to_csv(&self) -> String {
        export::to_csv(&self.visible().await, &self.date_format)
    }

    /// Export the displayed bills into `dir`
    pub async fn export_csv(&self, dir: &Path) -> Option<PathBuf> {
        let visible = self.visible().await;
        match export::write_csv(dir, &visible, &self.date_format).await {
            Ok(path) => Some(path),
            Err(e) => {
                self.report("export bills", &e);
                None
            }
        }
    }

    /// Text rendering of the displayed bills
    pub async fn render(&self) -> String {
        let visible = self.visible().await;
        let date_format = self.date_format.clone();
        boundary::guard(move || render_bills(&visible, &date_format))
    }
}

fn render_bills(bills: &[Bill], date_format: &str) -> String {
    if bills.is_empty() {
        return "No bills found\n".to_string();
    }

    let mut out = String::new();
    for bill in bills {
        out.push_str(&bill.name);
        out.push('\n');
        out.push_str(&format!(
            "  Amount: ${} | Due: {} | {}\n",
            bill.amount,
            format_date(bill.due_date, date_format),
            bill.category
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Category, InMemoryApi};
    use crate::config::DEFAULT_DATE_FORMAT;
    use crate::services::{ChannelToasts, ToastLevel, UpdateNotifier};
    use chrono::NaiveDate;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn create_test_view() -> (BillListView, InMemoryApi, UnboundedReceiver<Toast>) {
        let api = InMemoryApi::new();
        api.set_today(date("2024-02-15")).await;
        let service = BillsService::new(Arc::new(api.clone()), Arc::new(UpdateNotifier::new()));
        let (toasts, rx) = ChannelToasts::new();
        let view = BillListView::new(service, Arc::new(toasts), DEFAULT_DATE_FORMAT);
        (view, api, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Toast>) -> Vec<Toast> {
        let mut toasts = Vec::new();
        while let Ok(toast) = rx.try_recv() {
            toasts.push(toast);
        }
        toasts
    }

    #[tokio::test]
    async fn test_add_bill_refreshes_list() {
        let (view, _api, mut rx) = create_test_view().await;

        let bill = view
            .add_bill(&BillDraft::new("Electric", 90.0, date("2024-03-10")))
            .await
            .unwrap();

        assert_eq!(view.bills().await, vec![bill]);
        let toasts = drain(&mut rx);
        assert_eq!(toasts[0].message, "Bill added successfully!");
        assert_eq!(toasts[0].level, ToastLevel::Success);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_list() {
        let (view, api, mut rx) = create_test_view().await;
        view.add_bill(&BillDraft::new("Water", 40.0, date("2024-03-10")))
            .await
            .unwrap();
        drain(&mut rx);

        api.set_offline(true).await;
        assert!(!view.refresh().await);

        assert_eq!(view.bills().await.len(), 1);
        assert!(!view.is_loading().await);
        let toasts = drain(&mut rx);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "Failed to fetch bills");
        assert_eq!(toasts[0].level, ToastLevel::Error);
    }

    #[tokio::test]
    async fn test_server_error_message_is_relayed() {
        let (view, api, mut rx) = create_test_view().await;
        api.set_offline(true).await;

        let result = view
            .add_bill(&BillDraft::new("Water", 40.0, date("2024-03-10")))
            .await;

        assert!(result.is_none());
        let toasts = drain(&mut rx);
        assert_eq!(toasts[0].message, "Failed to add bill: Backend unavailable");
    }

    #[tokio::test]
    async fn test_validation_shows_warning_without_request() {
        let (view, api, mut rx) = create_test_view().await;

        assert!(view
            .add_bill(&BillDraft::new("Water", -1.0, date("2024-03-10")))
            .await
            .is_none());

        assert_eq!(api.request_count(), 0);
        let toasts = drain(&mut rx);
        assert_eq!(toasts[0].level, ToastLevel::Warning);
        assert_eq!(toasts[0].message, "Valid amount is required");
    }

    #[tokio::test]
    async fn test_mark_paid_moves_bill_between_tabs() {
        let (view, _api, _rx) = create_test_view().await;
        let bill = view
            .add_bill(&BillDraft::new("Rent", 1200.0, date("2024-03-01")))
            .await
            .unwrap();

        view.mark_paid(&bill.id).await.unwrap();
        assert!(view.bills().await.is_empty());

        view.set_tab(BillStatus::Paid).await;
        assert_eq!(view.bills().await.len(), 1);

        // paying twice neither duplicates nor removes it
        view.mark_paid(&bill.id).await.unwrap();
        let paid = view.bills().await;
        assert_eq!(paid.len(), 1);
        assert!(paid[0].paid);
    }

    #[tokio::test]
    async fn test_repeated_delete_reports_error_and_keeps_state() {
        let (view, _api, mut rx) = create_test_view().await;
        let keep = view
            .add_bill(&BillDraft::new("Water", 40.0, date("2024-03-10")))
            .await
            .unwrap();
        let gone = view
            .add_bill(&BillDraft::new("Gym", 30.0, date("2024-03-12")))
            .await
            .unwrap();

        assert!(view.delete_bill(&gone.id).await);
        drain(&mut rx);
        assert!(!view.delete_bill(&gone.id).await);

        assert_eq!(view.bills().await, vec![keep]);
        let toasts = drain(&mut rx);
        assert_eq!(toasts.len(), 1);
        assert!(toasts[0].message.starts_with("Failed to delete bill:"));
    }

    #[tokio::test]
    async fn test_search_and_sort_drive_visible_list() {
        let (view, _api, _rx) = create_test_view().await;
        for (name, amount, due, category) in [
            ("Electric", 90.0, "2024-03-10", Category::Utilities),
            ("Water", 40.0, "2024-03-12", Category::Utilities),
            ("Netflix", 15.5, "2024-03-01", Category::Subscription),
        ] {
            view.add_bill(&BillDraft::new(name, amount, date(due)).category(category))
                .await
                .unwrap();
        }

        view.set_search("util").await;
        view.set_sort(SortField::Amount).await;
        let names: Vec<String> = view.visible().await.into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Water", "Electric"]);

        view.set_sort(SortField::DueDate).await;
        let names: Vec<String> = view.visible().await.into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Electric", "Water"]);

        // raw cache is untouched by projection
        assert_eq!(view.bills().await.len(), 3);
    }

    #[tokio::test]
    async fn test_stale_response_is_dropped() {
        let (view, api, _rx) = create_test_view().await;
        api.seed_bill(Bill {
            id: "old".to_string(),
            name: "Old".to_string(),
            amount: 10.0,
            due_date: date("2024-01-01"),
            category: Category::Other,
            notes: None,
            is_recurring: false,
            paid: false,
        })
        .await;
        api.set_list_delay(BillStatus::Upcoming, Duration::from_millis(200))
            .await;

        // slow upcoming fetch, then a fast overdue fetch after a tab switch
        let slow = {
            let view = view.clone();
            tokio::spawn(async move { view.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        view.set_tab(BillStatus::Overdue).await;

        assert!(!slow.await.unwrap());
        let bills = view.bills().await;
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].id, "old");
        assert!(!view.is_loading().await);
    }

    #[tokio::test]
    async fn test_watch_updates_refetches() {
        let (view, api, _rx) = create_test_view().await;
        let handle = view.watch_updates();

        // another view creates a bill through the same service
        let other = BillListView::new(
            view.service.clone(),
            Arc::new(crate::services::LogToasts),
            DEFAULT_DATE_FORMAT,
        );
        other
            .service
            .create(&BillDraft::new("Phone", 25.0, date("2024-03-01")))
            .await
            .unwrap();

        for _ in 0..50 {
            if !view.bills().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(view.bills().await.len(), 1);
        assert!(api.request_count() >= 2);
        handle.abort();
    }

    #[tokio::test]
    async fn test_render_empty_and_filled() {
        let (view, _api, _rx) = create_test_view().await;
        assert_eq!(view.render().await, "No bills found\n");

        view.add_bill(&BillDraft::new("Rent", 1200.0, date("2024-03-01")).category(Category::RentMortgage))
            .await
            .unwrap();
        let rendered = view.render().await;
        assert!(rendered.contains("Rent"));
        assert!(rendered.contains("Amount: $1200 | Due: 3/1/2024 | Rent/Mortgage"));
    }

    #[tokio::test]
    async fn test_csv_follows_projection() {
        let (view, _api, _rx) = create_test_view().await;
        view.add_bill(&BillDraft::new("Electric", 90.0, date("2024-03-10")))
            .await
            .unwrap();
        view.add_bill(&BillDraft::new("Netflix", 15.5, date("2024-03-01")).category(Category::Subscription))
            .await
            .unwrap();

        view.set_search("elec").await;
        let csv = view.to_csv().await;
        assert_eq!(
            csv,
            "Name,Amount,Due Date,Category,Status\n\"Electric\",90,3/10/2024,Utilities,Pending\n"
        );
    }
}
