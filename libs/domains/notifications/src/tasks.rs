//! Task payloads carried on the notifications stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stream_worker::StreamJob;
use uuid::Uuid;

/// What to send. Arguments are primitives; records are loaded when the
/// task runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum NotificationTask {
    SendTestEmail {
        email: String,
        message: String,
    },
    PasswordResetTokenCreated {
        user_id: i64,
        token: String,
    },
    NewUserRegistered {
        user_id: i64,
    },
    OrderStatusChanged {
        user_id: i64,
        order_id: i64,
        status: String,
    },
}

impl NotificationTask {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SendTestEmail { .. } => "send_test_email",
            Self::PasswordResetTokenCreated { .. } => "password_reset_token_created",
            Self::NewUserRegistered { .. } => "new_user_registered",
            Self::OrderStatusChanged { .. } => "order_status_changed",
        }
    }
}

/// Stream entry: a task plus an id for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationJob {
    pub id: Uuid,
    #[serde(flatten)]
    pub task: NotificationTask,
    pub created_at: DateTime<Utc>,
}

impl NotificationJob {
    pub fn new(task: NotificationTask) -> Self {
        Self {
            id: Uuid::now_v7(),
            task,
            created_at: Utc::now(),
        }
    }
}

impl StreamJob for NotificationJob {
    fn job_id(&self) -> String {
        self.id.to_string()
    }

    fn job_kind(&self) -> &'static str {
        self.task.kind()
    }
}
