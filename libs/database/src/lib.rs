//! Connection helpers for the stores the notification worker depends on.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL pool via SeaORM
//! - `redis` (default) - Redis `ConnectionManager`
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::common::RetryConfig;
//! use database::{postgres, redis};
//!
//! let db = postgres::connect_from_config_with_retry(
//!     postgres::PostgresConfig::from_env()?,
//!     Some(RetryConfig::new().with_max_retries(5)),
//! )
//! .await?;
//! let redis = redis::connect_from_config_with_retry(redis::RedisConfig::from_env()?, None).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
