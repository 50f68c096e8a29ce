//! Application configuration
//!
//! Central location for constants and validation boundaries, plus the
//! runtime [`ClientConfig`] read from the environment.

use crate::error::{AppError, Result};
use std::time::Duration;

// ===== Bill Settings =====

/// Fixed set of bill categories, in display order
pub const BILL_CATEGORIES: &[&str] = &[
    "Utilities",
    "Rent/Mortgage",
    "Insurance",
    "Credit Card",
    "Loan",
    "Subscription",
    "Medical",
    "Other",
];

// ===== Reminder Settings Limits =====

/// Minimum number of days before the due date a reminder may fire
pub const MIN_DAYS_BEFORE: u32 = 1;

/// Maximum number of days before the due date (one month ahead)
pub const MAX_DAYS_BEFORE: u32 = 30;

/// Days-before value a fresh reminder form starts with
pub const DEFAULT_DAYS_BEFORE: u32 = 3;

// ===== Toast Durations =====

/// Auto-close delay for success and info toasts
pub const TOAST_SHORT: Duration = Duration::from_millis(3_000);

/// Auto-close delay for warning and error toasts
pub const TOAST_LONG: Duration = Duration::from_millis(5_000);

// ===== Export =====

/// File name used by the CSV export
pub const EXPORT_FILE_NAME: &str = "bills_export.csv";

/// Default due-date format for exports and labels (en-US short date)
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

// ===== Runtime Configuration =====

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Runtime settings for talking to the backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash
    pub api_url: String,
    /// Base URL of the Socket.IO server (ws:// or wss://)
    pub push_url: String,
    pub request_timeout: Duration,
    pub date_format: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_api_url(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    /// Config pointing at `api_url`, with the push URL derived from it.
    pub fn for_api_url(api_url: &str) -> Self {
        let api_url = api_url.trim_end_matches('/').to_string();
        Self {
            push_url: derive_push_url(&api_url),
            api_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Read configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("BILLMINDER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "BILLMINDER_API_URL must be an http(s) URL, got {}",
                api_url
            )));
        }

        let mut config = Self::for_api_url(&api_url);

        if let Some(push_url) = lookup("BILLMINDER_PUSH_URL") {
            config.push_url = push_url.trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("BILLMINDER_REQUEST_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("Invalid BILLMINDER_REQUEST_TIMEOUT_SECS: {}", raw))
            })?;
            config.request_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(format) = lookup("BILLMINDER_DATE_FORMAT") {
            if !format.is_empty() {
                config.date_format = format;
            }
        }

        tracing::debug!(api_url = %config.api_url, push_url = %config.push_url, "Loaded configuration");

        Ok(config)
    }
}

/// Map an http(s) API URL onto the matching ws(s) URL.
fn derive_push_url(api_url: &str) -> String {
    if let Some(rest) = api_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = api_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        api_url.to_string()
    }
}
