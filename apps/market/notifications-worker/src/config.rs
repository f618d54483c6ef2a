//! Worker process settings.

use core_config::{ConfigError, FromEnv, env_first, env_parse};

pub const DEFAULT_HEALTH_PORT: u16 = 8083;

/// Environment variables:
/// - `NOTIFICATIONS_WORKER_HEALTH_PORT`, then `HEALTH_PORT` (default: `8083`)
/// - `WORKER_CONSUMER_ID`, then `HOSTNAME` (default: random per process)
/// - `WORKER_BATCH_SIZE` (default: `10`)
/// - `WORKER_MAX_CONCURRENT_JOBS` (default: `4`)
/// - `WORKER_BLOCK_MS` (default: `1000`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    pub health_port: u16,
    pub consumer_id: Option<String>,
    pub batch_size: usize,
    pub max_concurrent_jobs: usize,
    pub block_ms: u64,
}

impl FromEnv for WorkerSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let health_port = match env_first(&["NOTIFICATIONS_WORKER_HEALTH_PORT", "HEALTH_PORT"]) {
            Some(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::ParseError {
                    key: "HEALTH_PORT".to_string(),
                    details: e.to_string(),
                }
            })?,
            None => DEFAULT_HEALTH_PORT,
        };

        Ok(Self {
            health_port,
            consumer_id: env_first(&["WORKER_CONSUMER_ID", "HOSTNAME"])
                .filter(|id| !id.trim().is_empty()),
            batch_size: env_parse("WORKER_BATCH_SIZE", 10)?,
            max_concurrent_jobs: env_parse("WORKER_MAX_CONCURRENT_JOBS", 4)?,
            block_ms: env_parse("WORKER_BLOCK_MS", 1000)?,
        })
    }
}
