//! Notifications Worker - Entry Point
//!
//! Background worker that sends marketplace emails from the Redis stream.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    market_notifications_worker::run().await
}
