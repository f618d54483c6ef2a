//! Notifications Worker Service
//!
//! Sends the marketplace's transactional emails from the notification
//! task stream.
//!
//! ## Architecture
//!
//! ```text
//! Redis Stream (notifications:tasks)
//!   ↓ (Consumer Group: notification_workers)
//! StreamWorker<NotificationJob, NotificationProcessor>
//!   ↓
//! NotificationDispatcher ── PgNotificationRepository ── PostgreSQL
//!   ↓
//! SmtpProvider
//! ```
//!
//! Failed tasks are logged, counted and acknowledged; nothing is retried.

pub mod config;

use async_trait::async_trait;
use axum::Router;
use config::WorkerSettings;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv, app_info};
use database::postgres::{DatabaseConnection, PostgresConfig, check_health};
use database::redis::RedisConfig;
use domain_notifications::{
    NotificationConfig, NotificationDispatcher, NotificationJob, NotificationProcessor,
    NotificationStream, PgNotificationRepository, SmtpConfig, SmtpProvider, TemplateEngine,
};
use eyre::{Result, WrapErr};
use std::sync::Arc;
use stream_worker::{
    HealthState, ProcessorProbe, ReadinessProbe, RedisProbe, StreamWorker, WorkerConfig,
    health_router, init_metrics,
};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

type Processor = NotificationProcessor<PgNotificationRepository, SmtpProvider>;

/// Readiness via `SELECT 1` on the pool.
struct PostgresProbe {
    db: DatabaseConnection,
}

#[async_trait]
impl ReadinessProbe for PostgresProbe {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn check(&self) -> Result<(), String> {
        check_health(&self.db).await.map_err(|e| e.to_string())
    }
}

/// Serve `/health`, `/ready`, `/stream/info` and `/metrics`.
async fn start_health_server(health_state: HealthState, port: u16) -> Result<()> {
    let app: Router = health_router(health_state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind health server to {}", addr))?;

    info!(port = %port, "Health server listening");

    axum::serve(listener, app)
        .await
        .wrap_err("Health server failed")?;

    Ok(())
}

fn worker_config(settings: &WorkerSettings) -> WorkerConfig {
    let config = WorkerConfig::from_stream_def::<NotificationStream>()
        .with_blocking(settings.block_ms)
        .with_batch_size(settings.batch_size)
        .with_max_concurrent_jobs(settings.max_concurrent_jobs);

    match &settings.consumer_id {
        Some(id) => config.with_consumer_id(id.clone()),
        None => config,
    }
}

/// Run the notifications worker
///
/// Connects to PostgreSQL and Redis, builds the SMTP provider, then
/// consumes notification tasks until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, a connection
/// cannot be established, or the worker stops on a fatal Redis error.
pub async fn run() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    if let Err(e) = init_metrics() {
        warn!(error = %e, "Prometheus recorder not installed, /metrics will be empty");
    }

    let app_info = app_info!();
    info!(name = %app_info.name, version = %app_info.version, environment = ?environment, "Starting notifications worker");

    let settings = WorkerSettings::from_env().wrap_err("Failed to load worker settings")?;
    let notification_config =
        NotificationConfig::from_env().wrap_err("Failed to load notification settings")?;
    let smtp_config = SmtpConfig::from_env().wrap_err("Failed to load SMTP settings")?;
    info!(smtp = ?smtp_config, token_file = ?notification_config.token_file, "Notification settings loaded");

    let pg_config =
        PostgresConfig::from_env().wrap_err("Failed to load PostgreSQL configuration")?;
    info!("Connecting to PostgreSQL...");
    let db = database::postgres::connect_from_config_with_retry(pg_config, None)
        .await
        .wrap_err("Failed to connect to PostgreSQL")?;

    let redis_config = RedisConfig::from_env().wrap_err("Failed to load Redis configuration")?;
    info!("Connecting to Redis...");
    let redis = database::redis::connect_from_config_with_retry(redis_config, None)
        .await
        .wrap_err("Failed to connect to Redis")?;

    let worker_config = worker_config(&settings);
    info!(
        stream = %worker_config.stream_name,
        consumer_group = %worker_config.consumer_group,
        consumer_id = %worker_config.consumer_id,
        block_timeout_ms = ?worker_config.block_timeout_ms,
        batch_size = worker_config.batch_size,
        max_concurrent_jobs = worker_config.max_concurrent_jobs,
        "Worker configuration loaded"
    );

    let provider = SmtpProvider::new(smtp_config).wrap_err("Failed to build SMTP provider")?;
    let templates = TemplateEngine::new().wrap_err("Failed to load email templates")?;
    let dispatcher = NotificationDispatcher::new(
        Arc::new(PgNotificationRepository::new(db.clone())),
        Arc::new(provider),
        templates,
        notification_config,
    );
    let processor: Arc<Processor> = Arc::new(NotificationProcessor::new(dispatcher));

    let worker = StreamWorker::<NotificationJob, _>::with_arc_processor(
        redis.clone(),
        Arc::clone(&processor),
        worker_config,
    );

    let health_state = HealthState::new(app_info.name, app_info.version)
        .with_probe(RedisProbe::new(redis))
        .with_probe(PostgresProbe { db })
        .with_probe(ProcessorProbe::<NotificationJob, _>::new(processor))
        .with_consumer(worker.consumer());

    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_state, settings.health_port).await {
            error!(error = %e, "Health server failed");
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!(error = %e, "Error waiting for shutdown signal");
        }
        let _ = shutdown_tx.send(true);
    });

    worker
        .run(shutdown_rx)
        .await
        .wrap_err("Notification worker stopped with an error")?;

    info!("Notifications worker stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .wrap_err("Failed to install SIGTERM handler")?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result.wrap_err("Failed to listen for Ctrl+C")?;
                info!("Received Ctrl+C, initiating shutdown...");
            },
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating shutdown...");
            },
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.wrap_err("Failed to listen for Ctrl+C")?;
        info!("Received Ctrl+C, initiating shutdown...");
    }

    Ok(())
}
