//! Stream definition for notification tasks.

use stream_worker::StreamDef;

/// Tasks enqueued by the web tier, consumed by the notifications worker.
pub struct NotificationStream;

impl StreamDef for NotificationStream {
    const STREAM_NAME: &'static str = "notifications:tasks";
    const CONSUMER_GROUP: &'static str = "notification_workers";
    const MAX_LENGTH: i64 = 100_000;
}
