//! Stream processor running notification tasks.

use crate::dispatcher::NotificationDispatcher;
use crate::providers::EmailProvider;
use crate::repository::NotificationRepository;
use crate::tasks::NotificationJob;
use async_trait::async_trait;
use std::sync::Arc;
use stream_worker::{StreamError, StreamProcessor};
use tracing::info;

/// `StreamProcessor` for `NotificationJob`s.
///
/// A failed task is reported to the worker, which logs, counts and
/// acknowledges it.
pub struct NotificationProcessor<R, P> {
    dispatcher: Arc<NotificationDispatcher<R, P>>,
}

impl<R, P> NotificationProcessor<R, P> {
    pub fn new(dispatcher: NotificationDispatcher<R, P>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

impl<R, P> Clone for NotificationProcessor<R, P> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

#[async_trait]
impl<R, P> StreamProcessor<NotificationJob> for NotificationProcessor<R, P>
where
    R: NotificationRepository + 'static,
    P: EmailProvider + 'static,
{
    async fn process(&self, job: &NotificationJob) -> Result<(), StreamError> {
        info!(job_id = %job.id, task = job.task.kind(), "Processing notification task");

        self.dispatcher.dispatch(&job.task).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "notification_processor"
    }

    async fn health_check(&self) -> Result<bool, StreamError> {
        Ok(self.dispatcher.provider().health_check().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotificationConfig;
    use crate::providers::MockEmailProvider;
    use crate::repository::InMemoryNotificationRepository;
    use crate::tasks::NotificationTask;
    use crate::templates::TemplateEngine;

    fn processor(
        provider: MockEmailProvider,
    ) -> NotificationProcessor<InMemoryNotificationRepository, MockEmailProvider> {
        NotificationProcessor::new(NotificationDispatcher::new(
            Arc::new(InMemoryNotificationRepository::new()),
            Arc::new(provider),
            TemplateEngine::new().unwrap(),
            NotificationConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_process_sends_test_email() {
        let provider = MockEmailProvider::new();
        let job = NotificationJob::new(NotificationTask::SendTestEmail {
            email: "ops@example.com".to_string(),
            message: "ping".to_string(),
        });

        processor(provider.clone()).process(&job).await.unwrap();

        let sent = provider.sent_to("ops@example.com");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "ping");
    }

    #[tokio::test]
    async fn test_task_failure_becomes_processing_error() {
        let job = NotificationJob::new(NotificationTask::NewUserRegistered { user_id: 404 });

        let err = processor(MockEmailProvider::new()).process(&job).await.unwrap_err();

        match err {
            StreamError::Processing(msg) => assert!(msg.contains("User not found: 404")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_health_follows_provider() {
        assert!(processor(MockEmailProvider::new()).health_check().await.unwrap());
        assert!(!processor(MockEmailProvider::failing()).health_check().await.unwrap());
    }
}
