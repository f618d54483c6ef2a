//! Stream producer for job enqueuing
//!
//! Used by any service (API, CLI, signal handlers) to queue jobs for
//! background processing.
//!
//! ```rust,ignore
//! let producer = StreamProducer::from_stream_def::<NotificationStream>(redis);
//! let entry_id = producer.send(&job).await?;
//! ```

use crate::error::StreamError;
use crate::registry::{StreamDef, StreamJob};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

/// Field holding the JSON payload in every stream entry.
pub(crate) const JOB_FIELD: &str = "job";

/// Generic stream producer for enqueuing jobs.
#[derive(Clone)]
pub struct StreamProducer {
    redis: ConnectionManager,
    stream_name: String,
    max_length: i64,
}

impl StreamProducer {
    /// Create a producer for an explicitly named stream.
    pub fn new(redis: ConnectionManager, stream_name: impl Into<String>) -> Self {
        Self {
            redis,
            stream_name: stream_name.into(),
            max_length: 100_000,
        }
    }

    /// Create a producer from a `StreamDef`, keeping name and MAXLEN in
    /// line with the worker.
    pub fn from_stream_def<S: StreamDef>(redis: ConnectionManager) -> Self {
        Self::new(redis, S::STREAM_NAME).with_max_length(S::MAX_LENGTH)
    }

    /// Set the maximum stream length (MAXLEN ~).
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Enqueue a job. Returns the Redis stream entry ID.
    pub async fn send<J: StreamJob>(&self, job: &J) -> Result<String, StreamError> {
        let mut conn = self.redis.clone();
        let payload = serde_json::to_string(job)?;

        let entry_id: String = redis::cmd("XADD")
            .arg(&self.stream_name)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.max_length)
            .arg("*")
            .arg(JOB_FIELD)
            .arg(&payload)
            .query_async(&mut conn)
            .await?;

        debug!(
            stream = %self.stream_name,
            entry_id = %entry_id,
            job_id = %job.job_id(),
            kind = job.job_kind(),
            "Enqueued job"
        );

        Ok(entry_id)
    }

    /// Current stream length.
    pub async fn stream_length(&self) -> Result<i64, StreamError> {
        let mut conn = self.redis.clone();
        let len: i64 = conn.xlen(&self.stream_name).await?;
        Ok(len)
    }
}
