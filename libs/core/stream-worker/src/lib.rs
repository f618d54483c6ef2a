//! Stream Worker Framework
//!
//! A small Redis Streams job queue used by background services.
//!
//! ## Features
//!
//! - **Producer**: `StreamProducer` enqueues serde jobs with `XADD MAXLEN ~`
//! - **Consumer groups**: horizontal scaling with `XREADGROUP`/`XACK`
//! - **Generic worker**: `StreamWorker<J, P>` runs any `StreamProcessor`
//!   with bounded concurrency and graceful shutdown
//! - **Prometheus metrics** and **health endpoints** for probes
//!
//! Jobs are delivered at most once to a processor: a message is
//! acknowledged after processing whether the processor succeeded or not.
//! Failures are logged and counted, never re-queued.
//!
//! ## Example
//!
//! ```ignore
//! use stream_worker::{StreamDef, StreamWorker, WorkerConfig};
//!
//! struct MailStream;
//! impl StreamDef for MailStream {
//!     const STREAM_NAME: &'static str = "mail:jobs";
//!     const CONSUMER_GROUP: &'static str = "mail_workers";
//! }
//!
//! let config = WorkerConfig::from_stream_def::<MailStream>();
//! let worker = StreamWorker::new(redis, processor, config);
//! worker.run(shutdown_rx).await?;
//! ```

mod config;
mod consumer;
mod error;
mod event;
mod health;
pub mod metrics;
mod producer;
mod registry;
mod worker;

pub use config::WorkerConfig;
pub use consumer::{StreamConsumer, StreamInfo};
pub use error::StreamError;
pub use event::StreamEvent;
pub use health::{
    health_router, HealthState, ProcessorProbe, ReadinessProbe, RedisProbe,
};
pub use metrics::{init_metrics, StreamMetrics};
pub use producer::StreamProducer;
pub use registry::{StreamDef, StreamJob, StreamProcessor};
pub use worker::StreamWorker;
