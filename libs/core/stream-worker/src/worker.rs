//! Generic stream worker
//!
//! Runs the consumer-group read loop and hands each job to a
//! `StreamProcessor`, with bounded concurrency and graceful shutdown.

use crate::config::WorkerConfig;
use crate::consumer::StreamConsumer;
use crate::error::StreamError;
use crate::event::StreamEvent;
use crate::metrics::StreamMetrics;
use crate::registry::{StreamJob, StreamProcessor};
use redis::aio::ConnectionManager;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const MAX_BACKOFF_SECS: u64 = 30;

/// Stream worker processing `J` jobs with processor `P`.
///
/// Every entry handed to the processor is acknowledged afterwards, whether
/// processing succeeded or failed. There is no retry and no dead-letter
/// stream; failures are logged and counted.
///
/// ```rust,ignore
/// let config = WorkerConfig::from_stream_def::<NotificationStream>()
///     .with_max_concurrent_jobs(4);
/// let worker = StreamWorker::new(redis, processor, config);
/// worker.run(shutdown_rx).await?;
/// ```
pub struct StreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J>,
{
    consumer: Arc<StreamConsumer>,
    processor: Arc<P>,
    config: WorkerConfig,
    metrics: StreamMetrics,
    permits: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    _job: PhantomData<fn() -> J>,
}

impl<J, P> StreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J> + 'static,
{
    pub fn new(redis: ConnectionManager, processor: P, config: WorkerConfig) -> Self {
        Self::with_arc_processor(redis, Arc::new(processor), config)
    }

    /// Create a worker sharing the processor with other owners (e.g. a
    /// readiness probe).
    pub fn with_arc_processor(
        redis: ConnectionManager,
        processor: Arc<P>,
        config: WorkerConfig,
    ) -> Self {
        let consumer = Arc::new(StreamConsumer::new(redis, config.clone()));
        let metrics = StreamMetrics::new(&config.stream_name, processor.name());

        Self {
            consumer,
            processor,
            permits: Arc::new(Semaphore::new(config.max_concurrent_jobs)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            metrics,
            config,
            _job: PhantomData,
        }
    }

    /// The consumer, for health endpoints.
    pub fn consumer(&self) -> Arc<StreamConsumer> {
        Arc::clone(&self.consumer)
    }

    /// Run until `shutdown` flips to `true`.
    ///
    /// Jobs already handed to the processor finish before this returns.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), StreamError> {
        info!(
            consumer_id = %self.config.consumer_id,
            stream = %self.config.stream_name,
            group = %self.config.consumer_group,
            processor = %self.processor.name(),
            blocking = self.config.is_blocking(),
            batch_size = self.config.batch_size,
            max_concurrent_jobs = self.config.max_concurrent_jobs,
            "Starting stream worker"
        );

        self.consumer.init_consumer_group().await?;
        self.drain_pending().await?;

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let stats_interval = Duration::from_secs(self.config.stats_interval_secs);
        let mut last_stats: Option<Instant> = None;
        let mut consecutive_errors: u32 = 0;

        loop {
            if *shutdown.borrow() {
                info!("Received shutdown signal, stopping worker");
                break;
            }

            if last_stats.is_none_or(|at| at.elapsed() >= stats_interval) {
                self.refresh_stats().await;
                last_stats = Some(Instant::now());
            }

            match self.consumer.read_new::<J>(self.config.batch_size).await {
                Ok(events) => {
                    if consecutive_errors > 0 {
                        info!(consecutive_errors, "Stream reads recovered");
                        consecutive_errors = 0;
                    }

                    if !events.is_empty() {
                        self.process_events(events).await;
                        continue;
                    }

                    // BLOCK already waited; polling mode sleeps here
                    if !self.config.is_blocking() && wait_or_shutdown(&mut shutdown, poll_interval).await {
                        info!("Received shutdown signal, stopping worker");
                        break;
                    }
                }
                Err(e) => {
                    consecutive_errors += 1;
                    self.metrics.read_error();

                    if e.is_nogroup() {
                        warn!("Consumer group missing, recreating");
                        if let Err(create_err) = self.consumer.init_consumer_group().await {
                            error!(error = %create_err, "Failed to recreate consumer group");
                        }
                        continue;
                    }

                    let backoff = if e.is_connection_error() {
                        Duration::from_secs(2u64.pow(consecutive_errors.min(5)).min(MAX_BACKOFF_SECS))
                    } else {
                        Duration::from_secs(1)
                    };

                    warn!(
                        error = %e,
                        consecutive_errors,
                        backoff_ms = backoff.as_millis() as u64,
                        "Failed to read from stream, backing off"
                    );

                    if wait_or_shutdown(&mut shutdown, backoff).await {
                        info!("Received shutdown signal, stopping worker");
                        break;
                    }
                }
            }
        }

        info!(consumer_id = %self.config.consumer_id, "Stream worker stopped");
        Ok(())
    }

    /// Process entries this consumer received before a restart.
    async fn drain_pending(&self) -> Result<(), StreamError> {
        // The cursor moves past entries that stay pending (a panicked job)
        let mut cursor = "0".to_string();

        loop {
            let pending = self
                .consumer
                .read_pending::<J>(&cursor, self.config.batch_size)
                .await?;

            let Some(last) = pending.last() else {
                return Ok(());
            };
            cursor = last.stream_id.clone();

            warn!(count = pending.len(), "Processing entries left pending by a previous run");
            self.process_events(pending).await;
        }
    }

    async fn refresh_stats(&self) {
        match self.consumer.stream_info().await {
            Ok(info) => {
                self.metrics.stream_depth(info.length);
                self.metrics.pending_count(info.pending_count);
            }
            Err(e) => debug!(error = %e, "Failed to refresh stream stats"),
        }
    }

    /// Process a batch, at most `max_concurrent_jobs` at a time, and wait
    /// for all of them.
    async fn process_events(&self, events: Vec<StreamEvent<J>>) {
        let mut join_set: JoinSet<()> = JoinSet::new();

        for event in events {
            let permits = Arc::clone(&self.permits);
            let processor = Arc::clone(&self.processor);
            let consumer = Arc::clone(&self.consumer);
            let metrics = self.metrics.clone();
            let in_flight = Arc::clone(&self.in_flight);

            join_set.spawn(async move {
                // The semaphore is never closed
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };

                metrics.in_flight(in_flight.fetch_add(1, Ordering::SeqCst) + 1);
                handle_event(processor.as_ref(), &consumer, &metrics, event).await;
                metrics.in_flight(in_flight.fetch_sub(1, Ordering::SeqCst) - 1);
            });
        }

        while let Some(joined) = join_set.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Job task panicked; its entry stays pending");
            }
        }
    }
}

/// Run one job through the processor, record the outcome, then acknowledge.
async fn handle_event<J, P>(
    processor: &P,
    consumer: &StreamConsumer,
    metrics: &StreamMetrics,
    event: StreamEvent<J>,
) where
    J: StreamJob,
    P: StreamProcessor<J>,
{
    let job = &event.job;
    let kind = job.job_kind();
    metrics.job_received(kind);

    debug!(
        stream_id = %event.stream_id,
        job_id = %job.job_id(),
        kind,
        queued_ms = event.age_ms(),
        redelivered = event.redelivered,
        "Processing job"
    );

    let started = Instant::now();
    match processor.process(job).await {
        Ok(()) => {
            metrics.job_succeeded(kind, started.elapsed());
            info!(
                job_id = %job.job_id(),
                kind,
                duration_ms = started.elapsed().as_millis() as u64,
                "Job completed"
            );
        }
        Err(e) => {
            metrics.job_failed(kind, started.elapsed());
            error!(
                stream_id = %event.stream_id,
                job_id = %job.job_id(),
                kind,
                error = %e,
                "Job failed"
            );
        }
    }

    if let Err(e) = consumer.ack(&event.stream_id).await {
        error!(stream_id = %event.stream_id, error = %e, "Failed to acknowledge entry");
    }
}

/// Sleep for `duration`; returns `true` if shutdown was requested meanwhile.
async fn wait_or_shutdown(shutdown: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    tokio::select! {
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
        _ = tokio::time::sleep(duration) => false,
    }
}
