//! Prometheus metrics for stream workers

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::info;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder.
///
/// Call once at startup; later calls return the existing handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    PROMETHEUS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics initialized");
        Ok(handle)
    })
}

/// Handle for rendering, if metrics were initialized
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Per-stream, per-processor metric helpers
#[derive(Clone, Debug)]
pub struct StreamMetrics {
    stream_name: String,
    processor_name: String,
}

impl StreamMetrics {
    pub fn new(stream_name: impl Into<String>, processor_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            processor_name: processor_name.into(),
        }
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub fn processor_name(&self) -> &str {
        &self.processor_name
    }

    pub fn job_received(&self, kind: &'static str) {
        counter!(
            "stream_worker_jobs_received_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone(),
            "kind" => kind
        )
        .increment(1);
    }

    pub fn job_succeeded(&self, kind: &'static str, duration: Duration) {
        self.job_finished(kind, "success", duration);
    }

    pub fn job_failed(&self, kind: &'static str, duration: Duration) {
        self.job_finished(kind, "failed", duration);
    }

    fn job_finished(&self, kind: &'static str, status: &'static str, duration: Duration) {
        counter!(
            "stream_worker_jobs_processed_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone(),
            "kind" => kind,
            "status" => status
        )
        .increment(1);

        histogram!(
            "stream_worker_job_duration_seconds",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone(),
            "kind" => kind
        )
        .record(duration.as_secs_f64());
    }

    pub fn in_flight(&self, count: usize) {
        gauge!(
            "stream_worker_jobs_in_flight",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .set(count as f64);
    }

    pub fn read_error(&self) {
        counter!(
            "stream_worker_read_errors_total",
            "stream" => self.stream_name.clone()
        )
        .increment(1);
    }

    pub fn stream_depth(&self, depth: i64) {
        gauge!(
            "stream_worker_stream_depth",
            "stream" => self.stream_name.clone()
        )
        .set(depth as f64);
    }

    pub fn pending_count(&self, count: i64) {
        gauge!(
            "stream_worker_pending_count",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .set(count as f64);
    }
}
