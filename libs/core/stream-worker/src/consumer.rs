//! Stream consumer for Redis operations
//!
//! Reads entries from a stream through a consumer group.

use crate::config::WorkerConfig;
use crate::error::StreamError;
use crate::event::StreamEvent;
use crate::producer::JOB_FIELD;
use crate::registry::StreamJob;
use redis::aio::ConnectionManager;
use redis::streams::{StreamPendingReply, StreamReadReply};
use redis::{AsyncCommands, RedisResult};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Queue depth and pending count of a consumer group.
#[derive(Debug, Clone, Serialize)]
pub struct StreamInfo {
    pub stream_name: String,
    pub consumer_group: String,
    pub length: i64,
    pub pending_count: i64,
}

/// Stream consumer bound to one stream, group and consumer name.
#[derive(Clone)]
pub struct StreamConsumer {
    redis: ConnectionManager,
    config: WorkerConfig,
}

impl StreamConsumer {
    pub fn new(redis: ConnectionManager, config: WorkerConfig) -> Self {
        Self { redis, config }
    }

    pub fn stream_name(&self) -> &str {
        &self.config.stream_name
    }

    pub fn consumer_group(&self) -> &str {
        &self.config.consumer_group
    }

    pub fn consumer_id(&self) -> &str {
        &self.config.consumer_id
    }

    /// Create the consumer group (and the stream) if missing.
    pub async fn init_consumer_group(&self) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();

        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => {
                info!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Created consumer group"
                );
                Ok(())
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Consumer group already exists"
                );
                Ok(())
            }
            Err(e) => Err(StreamError::Redis(e)),
        }
    }

    /// Read entries delivered to this consumer but never acknowledged,
    /// starting after entry id `after` ("0" for the beginning).
    pub async fn read_pending<J: StreamJob>(
        &self,
        after: &str,
        count: usize,
    ) -> Result<Vec<StreamEvent<J>>, StreamError> {
        let events = self.read_group::<J>(after, count, None).await?;
        Ok(events.into_iter().map(StreamEvent::redelivered).collect())
    }

    /// Read entries never delivered to any consumer of the group.
    pub async fn read_new<J: StreamJob>(
        &self,
        count: usize,
    ) -> Result<Vec<StreamEvent<J>>, StreamError> {
        self.read_group::<J>(">", count, self.config.block_timeout_ms)
            .await
    }

    async fn read_group<J: StreamJob>(
        &self,
        start_id: &str,
        count: usize,
        block_ms: Option<u64>,
    ) -> Result<Vec<StreamEvent<J>>, StreamError> {
        let mut conn = self.redis.clone();

        let mut cmd = redis::cmd("XREADGROUP");
        cmd.arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id);

        if let Some(timeout) = block_ms {
            cmd.arg("BLOCK").arg(timeout);
        }

        cmd.arg("COUNT")
            .arg(count)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg(start_id);

        // A BLOCK timeout answers with nil
        let reply: Option<StreamReadReply> = cmd.query_async(&mut conn).await?;
        let Some(reply) = reply else {
            return Ok(Vec::new());
        };

        let (events, malformed) = decode_reply::<J>(reply);

        // Entries that can never be decoded are dropped from the pending list
        if !malformed.is_empty() {
            self.ack_many(&malformed).await?;
        }

        Ok(events)
    }

    /// Acknowledge one entry.
    pub async fn ack(&self, stream_id: &str) -> Result<(), StreamError> {
        self.ack_many(&[stream_id.to_string()]).await
    }

    async fn ack_many(&self, stream_ids: &[String]) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();
        let acked: i64 = conn
            .xack(&self.config.stream_name, &self.config.consumer_group, stream_ids)
            .await?;

        debug!(count = acked, "Acknowledged entries");
        Ok(())
    }

    /// Stream length and group pending count.
    pub async fn stream_info(&self) -> Result<StreamInfo, StreamError> {
        let mut conn = self.redis.clone();

        let length: i64 = conn.xlen(&self.config.stream_name).await?;
        let pending: RedisResult<StreamPendingReply> = conn
            .xpending(&self.config.stream_name, &self.config.consumer_group)
            .await;

        // NOGROUP before the worker has created the group
        let pending_count = pending.map(|reply| reply.count() as i64).unwrap_or(0);

        Ok(StreamInfo {
            stream_name: self.config.stream_name.clone(),
            consumer_group: self.config.consumer_group.clone(),
            length,
            pending_count,
        })
    }
}

/// Split an `XREADGROUP` reply into decoded events and undecodable entry ids.
fn decode_reply<J: StreamJob>(reply: StreamReadReply) -> (Vec<StreamEvent<J>>, Vec<String>) {
    let mut events = Vec::new();
    let mut malformed = Vec::new();

    for entry in reply.keys.into_iter().flat_map(|key| key.ids) {
        let Some(payload) = entry.get::<String>(JOB_FIELD) else {
            warn!(
                stream_id = %entry.id,
                fields = ?entry.map.keys().collect::<Vec<_>>(),
                "Entry has no job field, dropping"
            );
            malformed.push(entry.id);
            continue;
        };

        match serde_json::from_str::<J>(&payload) {
            Ok(job) => events.push(StreamEvent::new(entry.id, job)),
            Err(e) => {
                warn!(stream_id = %entry.id, error = %e, "Failed to decode job, dropping");
                malformed.push(entry.id);
            }
        }
    }

    (events, malformed)
}
