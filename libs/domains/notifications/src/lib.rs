//! Marketplace notifications domain
//!
//! Transactional emails triggered by account and order events:
//!
//! - test email to an arbitrary address
//! - password reset token
//! - welcome email with the confirmation token
//! - order status update to the buyer and the shop owner
//!
//! ```text
//! web tier ── NotificationService ──▶ Redis stream (notifications:tasks)
//!                                           │
//!                     StreamWorker ◀────────┘
//!                          │
//!               NotificationProcessor ─▶ NotificationDispatcher
//!                                          │              │
//!                            NotificationRepository   EmailProvider (SMTP)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::NotificationService;
//!
//! let service = NotificationService::new(redis);
//! service.new_user_registered(user_id).await?;
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod postgres_repository;
pub mod processor;
pub mod providers;
pub mod repository;
pub mod service;
pub mod streams;
pub mod tasks;
pub mod templates;
pub mod token_file;

pub use config::NotificationConfig;
pub use dispatcher::NotificationDispatcher;
pub use error::{NotificationError, NotificationResult};
pub use models::{ConfirmToken, OrderSnapshot, User};
pub use postgres_repository::PgNotificationRepository;
pub use processor::NotificationProcessor;
pub use providers::{EmailProvider, MockEmailProvider, SmtpConfig, SmtpProvider};
pub use repository::{InMemoryNotificationRepository, NotificationRepository};
pub use service::NotificationService;
pub use streams::NotificationStream;
pub use tasks::{NotificationJob, NotificationTask};
pub use templates::TemplateEngine;
