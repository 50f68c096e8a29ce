//! Billminder library
//!
//! Client for a bill-tracking backend: bill and reminder CRUD, the
//! filtered/sorted bill list, CSV export and realtime update toasts.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod push;
pub mod services;
pub mod views;
