//! Error types for the notifications domain.

use stream_worker::StreamError;
use thiserror::Error;

pub type NotificationResult<T> = Result<T, NotificationError>;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    /// Address rejected before handing the message to the transport.
    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Email provider error: {0}")]
    Provider(String),

    #[error("Template rendering error: {0}")]
    Template(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Failed to write confirmation token file {path}: {reason}")]
    TokenFile { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Config(#[from] core_config::ConfigError),
}

impl From<sea_orm::DbErr> for NotificationError {
    fn from(err: sea_orm::DbErr) -> Self {
        NotificationError::Database(err.to_string())
    }
}

impl From<handlebars::RenderError> for NotificationError {
    fn from(err: handlebars::RenderError) -> Self {
        NotificationError::Template(err.to_string())
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::Serialization(err.to_string())
    }
}

impl From<StreamError> for NotificationError {
    fn from(err: StreamError) -> Self {
        NotificationError::Queue(err.to_string())
    }
}

/// Task failures surface to the worker as processing errors.
impl From<NotificationError> for StreamError {
    fn from(err: NotificationError) -> Self {
        StreamError::Processing(err.to_string())
    }
}
