//! Health check handlers for stream workers.
//!
//! - Liveness: `/health`, `/healthz`
//! - Readiness: `/ready`, `/readyz` (runs every registered probe)
//! - Stream monitoring: `/stream/info`
//! - Prometheus metrics: `/metrics`

use crate::consumer::StreamConsumer;
use crate::metrics;
use crate::registry::{StreamJob, StreamProcessor};
use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use redis::aio::ConnectionManager;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;

/// A dependency check run by the readiness endpoint.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self) -> Result<(), String>;
}

/// Readiness via Redis `PING`.
pub struct RedisProbe {
    redis: ConnectionManager,
}

impl RedisProbe {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl ReadinessProbe for RedisProbe {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn check(&self) -> Result<(), String> {
        let mut conn = self.redis.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| format!("error: {}", e))?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(format!("unexpected response: {}", pong))
        }
    }
}

/// Readiness via `StreamProcessor::health_check`.
pub struct ProcessorProbe<J, P> {
    processor: Arc<P>,
    _job: PhantomData<fn() -> J>,
}

impl<J, P> ProcessorProbe<J, P> {
    pub fn new(processor: Arc<P>) -> Self {
        Self {
            processor,
            _job: PhantomData,
        }
    }
}

#[async_trait]
impl<J, P> ReadinessProbe for ProcessorProbe<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J> + 'static,
{
    fn name(&self) -> &'static str {
        self.processor.name()
    }

    async fn check(&self) -> Result<(), String> {
        match self.processor.health_check().await {
            Ok(true) => Ok(()),
            Ok(false) => Err("reported unhealthy".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Shared state for health endpoints.
#[derive(Clone)]
pub struct HealthState {
    pub app_name: String,
    pub app_version: String,
    probes: Vec<Arc<dyn ReadinessProbe>>,
    consumer: Option<Arc<StreamConsumer>>,
}

impl HealthState {
    pub fn new(app_name: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            app_version: app_version.into(),
            probes: Vec::new(),
            consumer: None,
        }
    }

    /// Add a readiness probe.
    pub fn with_probe(mut self, probe: impl ReadinessProbe + 'static) -> Self {
        self.probes.push(Arc::new(probe));
        self
    }

    /// Expose queue statistics of this consumer on `/stream/info`.
    pub fn with_consumer(mut self, consumer: Arc<StreamConsumer>) -> Self {
        self.consumer = Some(consumer);
        self
    }
}

/// Health response for liveness probes.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: String,
    pub version: String,
}

/// Liveness: always OK while the process serves requests.
pub async fn health_handler(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        name: state.app_name,
        version: state.app_version,
    })
}

/// Readiness: 200 when every probe passes, 503 otherwise.
pub async fn ready_handler(State(state): State<HealthState>) -> (StatusCode, Json<Value>) {
    let mut checks = Map::new();
    let mut ready = true;

    for probe in &state.probes {
        let outcome = match probe.check().await {
            Ok(()) => Value::from("ok"),
            Err(reason) => {
                ready = false;
                Value::from(reason)
            }
        };
        checks.insert(probe.name().to_string(), outcome);
    }

    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (status, Json(json!({ "status": label, "checks": checks })))
}

/// Queue depth and pending count of the worker's consumer group.
pub async fn stream_info_handler(State(state): State<HealthState>) -> (StatusCode, Json<Value>) {
    let Some(consumer) = state.consumer else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No stream consumer registered" })),
        );
    };

    match consumer.stream_info().await {
        Ok(info) => (StatusCode::OK, Json(json!(info))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to get stream info: {}", e) })),
        ),
    }
}

/// Prometheus scrape endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::prometheus_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Metrics not initialized. Call init_metrics() at startup.".to_string(),
        ),
    }
}

/// Router with all health endpoints.
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/readyz", get(ready_handler))
        .route("/stream/info", get(stream_info_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
