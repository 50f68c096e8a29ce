//! Application state and initialization
//!
//! This module wires the backend client, the update notifier and the toast
//! sink into services. Views and the push listener are created from here.

use crate::api::{BillApi, HttpApi, ReminderApi};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::push::{PushListener, PushSubscription};
use crate::services::{BillsService, RemindersService, SharedToasts, UpdateNotifier};
use crate::views::{BillListView, ReminderListView};
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub toasts: SharedToasts,
    pub notifier: Arc<UpdateNotifier>,
    pub bills_service: BillsService,
    pub reminders_service: RemindersService,
}

impl AppState {
    /// Build the state on top of any backend implementation
    pub fn new<A>(config: ClientConfig, api: Arc<A>, toasts: SharedToasts) -> Self
    where
        A: BillApi + ReminderApi + 'static,
    {
        let notifier = Arc::new(UpdateNotifier::new());
        let bills_service = BillsService::new(api.clone(), notifier.clone());
        let reminders_service = RemindersService::new(api);

        Self {
            config,
            toasts,
            notifier,
            bills_service,
            reminders_service,
        }
    }

    pub fn bill_list(&self) -> BillListView {
        BillListView::new(
            self.bills_service.clone(),
            self.toasts.clone(),
            self.config.date_format.clone(),
        )
    }

    pub fn reminder_list(&self) -> ReminderListView {
        ReminderListView::new(
            self.reminders_service.clone(),
            self.bills_service.clone(),
            self.toasts.clone(),
            self.config.date_format.clone(),
        )
    }

    /// Open the push channel; keep the subscription alive as long as the app
    pub fn start_push(&self) -> PushSubscription {
        PushListener::new(&self.config.push_url, self.toasts.clone()).start()
    }
}

/// Application setup - called once on startup
pub fn setup(config: ClientConfig, toasts: SharedToasts) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("Backend: {}", config.api_url);

    let api = Arc::new(HttpApi::new(&config)?);
    let state = AppState::new(config, api, toasts);

    tracing::info!("Application initialized successfully");

    Ok(state)
}
