//! Stream event wrapper
//!
//! Pairs a decoded job with its stream entry metadata.

use crate::registry::StreamJob;
use chrono::{DateTime, Utc};

/// A stream entry carrying a decoded job
#[derive(Debug, Clone)]
pub struct StreamEvent<J: StreamJob> {
    /// Redis stream entry ID (e.g., "1234567890123-0")
    pub stream_id: String,

    /// The job payload
    pub job: J,

    /// Enqueue time, taken from the entry ID
    pub enqueued_at: DateTime<Utc>,

    /// Read from this consumer's pending list rather than as a new entry
    pub redelivered: bool,
}

impl<J: StreamJob> StreamEvent<J> {
    pub fn new(stream_id: String, job: J) -> Self {
        let enqueued_at = Self::parse_timestamp(&stream_id);
        Self {
            stream_id,
            job,
            enqueued_at,
            redelivered: false,
        }
    }

    pub fn redelivered(mut self) -> Self {
        self.redelivered = true;
        self
    }

    /// Stream IDs are "timestamp_ms-sequence"
    fn parse_timestamp(stream_id: &str) -> DateTime<Utc> {
        stream_id
            .split('-')
            .next()
            .and_then(|ts| ts.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now)
    }

    /// Time spent in the queue, in milliseconds
    pub fn age_ms(&self) -> i64 {
        (Utc::now() - self.enqueued_at).num_milliseconds()
    }
}
