//! Enqueue API used by the web tier's event handlers.

use crate::error::NotificationResult;
use crate::streams::NotificationStream;
use crate::tasks::{NotificationJob, NotificationTask};
use redis::aio::ConnectionManager;
use stream_worker::StreamProducer;
use tracing::info;

/// Queues notification tasks; each method returns the stream entry id.
///
/// ```rust,ignore
/// let service = NotificationService::new(redis);
/// service.order_status_changed(user.id, order.id, "confirmed").await?;
/// ```
#[derive(Clone)]
pub struct NotificationService {
    producer: StreamProducer,
}

impl NotificationService {
    pub fn new(redis: ConnectionManager) -> Self {
        Self::with_producer(StreamProducer::from_stream_def::<NotificationStream>(redis))
    }

    pub fn with_producer(producer: StreamProducer) -> Self {
        Self { producer }
    }

    pub async fn enqueue(&self, task: NotificationTask) -> NotificationResult<String> {
        let job = NotificationJob::new(task);
        let entry_id = self.producer.send(&job).await?;

        info!(
            job_id = %job.id,
            task = job.task.kind(),
            entry_id = %entry_id,
            stream = self.producer.stream_name(),
            "Queued notification task"
        );
        Ok(entry_id)
    }

    pub async fn send_test_email(
        &self,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> NotificationResult<String> {
        self.enqueue(NotificationTask::SendTestEmail {
            email: email.into(),
            message: message.into(),
        })
        .await
    }

    pub async fn password_reset_token_created(
        &self,
        user_id: i64,
        token: impl Into<String>,
    ) -> NotificationResult<String> {
        self.enqueue(NotificationTask::PasswordResetTokenCreated {
            user_id,
            token: token.into(),
        })
        .await
    }

    pub async fn new_user_registered(&self, user_id: i64) -> NotificationResult<String> {
        self.enqueue(NotificationTask::NewUserRegistered { user_id })
            .await
    }

    pub async fn order_status_changed(
        &self,
        user_id: i64,
        order_id: i64,
        status: impl Into<String>,
    ) -> NotificationResult<String> {
        self.enqueue(NotificationTask::OrderStatusChanged {
            user_id,
            order_id,
            status: status.into(),
        })
        .await
    }

    /// Current stream length.
    pub async fn queue_depth(&self) -> NotificationResult<i64> {
        Ok(self.producer.stream_length().await?)
    }
}
