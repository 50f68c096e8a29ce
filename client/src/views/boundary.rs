//! Error boundary for rendering
//!
//! A panicking renderer yields a fallback text instead of taking the
//! caller down with it.

use std::any::Any;
use std::panic::{self, UnwindSafe};

pub const FALLBACK: &str = "Something went wrong. Please try again.";

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

/// Run `render`, returning [`FALLBACK`] if it panics
pub fn guard<F>(render: F) -> String
where
    F: FnOnce() -> String + UnwindSafe,
{
    match panic::catch_unwind(render) {
        Ok(output) => output,
        Err(payload) => {
            tracing::error!("Rendering failed: {}", panic_message(payload.as_ref()));
            FALLBACK.to_string()
        }
    }
}
