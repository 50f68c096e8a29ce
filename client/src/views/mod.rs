//! Views exposed to the terminal front end
//!
//! This module organizes screen state into logical submodules:
//! - `bill_list`: status tabs, search, sort, bill CRUD and CSV export
//! - `reminders`: reminder CRUD joined against upcoming bills
//! - `projection`: pure filter/sort of a bill list
//! - `boundary`: fallback rendering when a renderer panics

pub mod bill_list;
pub mod boundary;
pub mod projection;
pub mod reminders;

pub use bill_list::BillListView;
pub use projection::project;
pub use reminders::{ReminderEntry, ReminderListView};
