//! Email provider abstraction.

mod mock;
mod smtp;

pub use mock::MockEmailProvider;
pub use smtp::{SmtpConfig, SmtpProvider};

use crate::error::NotificationResult;
use async_trait::async_trait;

/// A sent email with the provider's message id, if it reported one.
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub message_id: Option<String>,
    pub accepted: bool,
}

/// Plain-text email ready for sending. The sender comes from the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailContent {
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

impl EmailContent {
    pub fn new(to_email: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to_email: to_email.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;

    async fn health_check(&self) -> NotificationResult<bool>;
}
