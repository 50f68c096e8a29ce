//! Services module
//!
//! Business logic services that coordinate between views and the backend API.

pub mod bills;
pub mod export;
pub mod notifier;
pub mod reminders;
pub mod toasts;

pub use bills::BillsService;
pub use notifier::{UpdateNotifier, UpdateReceiver};
pub use reminders::RemindersService;
pub use toasts::{ChannelToasts, LogToasts, SharedToasts, Toast, ToastLevel, ToastSink};
