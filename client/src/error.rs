//! Error types for Billminder
//!
//! All errors use thiserror for structured error handling.
//! Views turn these into toasts; nothing here is meant to crash a screen.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Server { status: u16, message: Option<String> },

    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
        message: Option<String>,
    },

    #[error("Push channel error: {0}")]
    Push(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Text shown to the user in a toast.
    ///
    /// Server messages are relayed verbatim when the backend sent one.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Server {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            AppError::Server { status, .. } => {
                format!("Request failed with status code {}", status)
            }
            AppError::NotFound {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            AppError::NotFound { .. } => "Request failed with status code 404".to_string(),
            other => other.to_string(),
        }
    }

    /// Missing record with no server message attached
    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound {
            resource: resource.into(),
            message: None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for AppError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        AppError::Push(err.to_string())
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.user_message())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
