//! Stream registry types.
//!
//! - `StreamDef` names a stream and its consumer group
//! - `StreamJob` is the payload carried in the `job` field of each entry
//! - `StreamProcessor` handles one job at a time

use crate::error::StreamError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Stream definition trait.
///
/// Each domain implements this to pin its stream configuration, so the
/// producer and the worker always agree on names.
///
/// ```rust,ignore
/// pub struct NotificationStream;
///
/// impl StreamDef for NotificationStream {
///     const STREAM_NAME: &'static str = "notifications:tasks";
///     const CONSUMER_GROUP: &'static str = "notification_workers";
/// }
/// ```
pub trait StreamDef: Send + Sync {
    /// The Redis stream key.
    const STREAM_NAME: &'static str;

    /// The consumer group reading the stream.
    const CONSUMER_GROUP: &'static str;

    /// Approximate cap applied on every `XADD` (`MAXLEN ~`).
    const MAX_LENGTH: i64 = 100_000;

    fn stream_name() -> &'static str {
        Self::STREAM_NAME
    }

    fn consumer_group() -> &'static str {
        Self::CONSUMER_GROUP
    }
}

/// A job carried on a stream.
pub trait StreamJob: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// Unique id for logging and tracing.
    fn job_id(&self) -> String;

    /// Short name of the job kind, used as a log field.
    fn job_kind(&self) -> &'static str {
        "job"
    }
}

/// Processes jobs read from a stream.
///
/// ```rust,ignore
/// #[async_trait]
/// impl StreamProcessor<MailJob> for MailProcessor {
///     async fn process(&self, job: &MailJob) -> Result<(), StreamError> {
///         self.mailer.send(&job.to, &job.body).await.map_err(StreamError::from)
///     }
///
///     fn name(&self) -> &'static str {
///         "mail_processor"
///     }
/// }
/// ```
#[async_trait]
pub trait StreamProcessor<J: StreamJob>: Send + Sync {
    /// Process a single job. An `Err` is logged and counted; the message
    /// is acknowledged either way.
    async fn process(&self, job: &J) -> Result<(), StreamError>;

    /// Processor name for logs and metric labels.
    fn name(&self) -> &'static str;

    /// Readiness of downstream dependencies. Defaults to healthy.
    async fn health_check(&self) -> Result<bool, StreamError> {
        Ok(true)
    }
}
