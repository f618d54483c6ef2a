//! Worker configuration

use crate::registry::StreamDef;
use uuid::Uuid;

/// Configuration for the stream worker
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Redis stream name
    pub stream_name: String,

    /// Consumer group name
    pub consumer_group: String,

    /// Consumer name inside the group (auto-generated if not provided)
    pub consumer_id: String,

    /// Maximum stream length before trimming
    pub max_length: i64,

    /// Entries read per `XREADGROUP`
    pub batch_size: usize,

    /// `BLOCK` timeout in milliseconds; `None` switches to polling
    pub block_timeout_ms: Option<u64>,

    /// Sleep between polls when not blocking
    pub poll_interval_ms: u64,

    /// Jobs processed in parallel
    pub max_concurrent_jobs: usize,

    /// How often queue depth gauges are refreshed
    pub stats_interval_secs: u64,
}

impl WorkerConfig {
    /// Create a WorkerConfig from a StreamDef
    pub fn from_stream_def<S: StreamDef>() -> Self {
        Self::new(S::STREAM_NAME, S::CONSUMER_GROUP).with_max_length(S::MAX_LENGTH)
    }

    /// Create a WorkerConfig with explicit stream and group names
    pub fn new(stream_name: impl Into<String>, consumer_group: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            consumer_group: consumer_group.into(),
            consumer_id: format!("worker-{}", Uuid::new_v4()),
            max_length: 100_000,
            batch_size: 10,
            block_timeout_ms: Some(1000),
            poll_interval_ms: 500,
            max_concurrent_jobs: 1,
            stats_interval_secs: 15,
        }
    }

    pub fn with_consumer_id(mut self, id: impl Into<String>) -> Self {
        self.consumer_id = id.into();
        self
    }

    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Block on `XREADGROUP` for up to `timeout_ms` (0 is treated as polling,
    /// since `BLOCK 0` would never return and never observe shutdown).
    pub fn with_blocking(mut self, timeout_ms: u64) -> Self {
        self.block_timeout_ms = (timeout_ms > 0).then_some(timeout_ms);
        self
    }

    pub fn with_polling(mut self, interval_ms: u64) -> Self {
        self.block_timeout_ms = None;
        self.poll_interval_ms = interval_ms;
        self
    }

    pub fn with_max_concurrent_jobs(mut self, count: usize) -> Self {
        self.max_concurrent_jobs = count.max(1);
        self
    }

    pub fn with_stats_interval_secs(mut self, secs: u64) -> Self {
        self.stats_interval_secs = secs.max(1);
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.block_timeout_ms.is_some()
    }
}
