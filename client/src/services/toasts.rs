//! Toast notifications
//!
//! The user-facing notification surface. Every failure caught by a view and
//! every push event ends up here as a [`Toast`].

use crate::config::{TOAST_LONG, TOAST_SHORT};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    /// How long the toast stays on screen
    #[serde(skip)]
    pub auto_close: Duration,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Success, message, TOAST_SHORT)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Info, message, TOAST_SHORT)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Warning, message, TOAST_LONG)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, message, TOAST_LONG)
    }

    fn new(level: ToastLevel, message: impl Into<String>, auto_close: Duration) -> Self {
        Self {
            level,
            message: message.into(),
            auto_close,
        }
    }
}

/// Somewhere toasts can be shown
pub trait ToastSink: Send + Sync {
    fn show(&self, toast: Toast);
}

pub type SharedToasts = Arc<dyn ToastSink>;

/// Sink that only writes toasts to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogToasts;

impl ToastSink for LogToasts {
    fn show(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => tracing::error!("Toast: {}", toast.message),
            ToastLevel::Warning => tracing::warn!("Toast: {}", toast.message),
            ToastLevel::Success | ToastLevel::Info => tracing::info!("Toast: {}", toast.message),
        }
    }
}

/// Sink forwarding toasts to a channel, drained by whatever renders them
#[derive(Debug, Clone)]
pub struct ChannelToasts {
    tx: mpsc::UnboundedSender<Toast>,
}

impl ChannelToasts {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ToastSink for ChannelToasts {
    fn show(&self, toast: Toast) {
        if self.tx.send(toast).is_err() {
            tracing::debug!("Toast receiver dropped");
        }
    }
}
