use super::{EmailContent, EmailProvider, SentEmail};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Provider that records emails instead of sending them.
///
/// Clones share the outbox, so a test can keep one handle while the
/// dispatcher owns another.
#[derive(Debug, Clone, Default)]
pub struct MockEmailProvider {
    sent: Arc<Mutex<Vec<EmailContent>>>,
    fail_for: Arc<Mutex<Vec<String>>>,
    fail_all: Arc<AtomicBool>,
}

impl MockEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails with a provider error.
    pub fn failing() -> Self {
        let provider = Self::default();
        provider.fail_all.store(true, Ordering::SeqCst);
        provider
    }

    /// Sends to `address` fail; others are recorded.
    pub fn fail_for(&self, address: impl Into<String>) {
        if let Ok(mut list) = self.fail_for.lock() {
            list.push(address.into());
        }
    }

    pub fn sent(&self) -> Vec<EmailContent> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn sent_to(&self, address: &str) -> Vec<EmailContent> {
        self.sent()
            .into_iter()
            .filter(|email| email.to_email == address)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }

    fn should_fail(&self, address: &str) -> bool {
        self.fail_all.load(Ordering::SeqCst)
            || self
                .fail_for
                .lock()
                .map(|list| list.iter().any(|a| a == address))
                .unwrap_or(false)
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail> {
        if self.should_fail(&email.to_email) {
            return Err(NotificationError::Provider(format!(
                "mock rejected {}",
                email.to_email
            )));
        }

        let mut sent = self
            .sent
            .lock()
            .map_err(|_| NotificationError::Provider("mock outbox poisoned".to_string()))?;
        sent.push(email.clone());

        Ok(SentEmail {
            message_id: Some(format!("mock-{}", sent.len())),
            accepted: true,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    async fn health_check(&self) -> NotificationResult<bool> {
        Ok(!self.fail_all.load(Ordering::SeqCst))
    }
}
