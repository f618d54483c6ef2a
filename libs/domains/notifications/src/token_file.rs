//! Confirmation token dump for the designated test account.
//!
//! End-to-end registration tests read the key from this file instead of
//! a mailbox.

use crate::error::{NotificationError, NotificationResult};
use serde_json::json;
use std::path::Path;
use tracing::debug;

/// Write `{"tok": "<key>"}` to `path`, replacing previous content.
pub async fn write_token_file(path: &Path, key: &str) -> NotificationResult<()> {
    let payload = serde_json::to_vec(&json!({ "tok": key }))?;

    tokio::fs::write(path, payload)
        .await
        .map_err(|e| NotificationError::TokenFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    debug!(path = %path.display(), "Wrote confirmation token file");
    Ok(())
}
