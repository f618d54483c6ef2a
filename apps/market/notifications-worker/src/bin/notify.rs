//! Enqueue notification tasks by hand
//!
//! Run with: cargo run -p market_notifications_worker --bin notify -- <command>
//!
//! ```text
//! notify test-email ops@example.com "Hello from staging"
//! notify welcome 42
//! notify order-status --user 42 --order 1001 confirmed
//! ```

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use database::redis::RedisConfig;
use domain_notifications::NotificationService;
use eyre::{Result, WrapErr};
use tracing::info;

#[derive(Parser)]
#[command(name = "notify")]
#[command(about = "Queue marketplace notification emails")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an arbitrary message to one address
    TestEmail {
        email: String,

        #[arg(default_value = "Test message")]
        message: String,
    },

    /// Mail a password reset key to a user
    PasswordReset { user_id: i64, token: String },

    /// Send the welcome email with the confirmation token
    Welcome { user_id: i64 },

    /// Notify the buyer and the shop owner about an order status
    OrderStatus {
        #[arg(long = "user")]
        user_id: i64,

        #[arg(long = "order")]
        order_id: i64,

        status: String,
    },

    /// Show how many entries the notification stream holds
    Depth,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let cli = Cli::parse();

    let redis_config = RedisConfig::from_env().wrap_err("Failed to load Redis configuration")?;
    let redis = database::redis::connect_from_config_with_retry(redis_config, None)
        .await
        .wrap_err("Failed to connect to Redis")?;
    let service = NotificationService::new(redis);

    let entry_id = match cli.command {
        Commands::TestEmail { email, message } => service.send_test_email(email, message).await?,
        Commands::PasswordReset { user_id, token } => {
            service.password_reset_token_created(user_id, token).await?
        }
        Commands::Welcome { user_id } => service.new_user_registered(user_id).await?,
        Commands::OrderStatus {
            user_id,
            order_id,
            status,
        } => service.order_status_changed(user_id, order_id, status).await?,
        Commands::Depth => {
            let depth = service.queue_depth().await?;
            println!("{}", depth);
            return Ok(());
        }
    };

    info!(entry_id = %entry_id, "Task queued");
    println!("{}", entry_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_order_status() {
        let cli = Cli::parse_from(["notify", "order-status", "--user", "4", "--order", "9", "sent"]);

        match cli.command {
            Commands::OrderStatus {
                user_id,
                order_id,
                status,
            } => {
                assert_eq!(user_id, 4);
                assert_eq!(order_id, 9);
                assert_eq!(status, "sent");
            }
            _ => panic!("expected order-status"),
        }
    }

    #[test]
    fn test_test_email_default_message() {
        let cli = Cli::parse_from(["notify", "test-email", "ops@example.com"]);

        assert!(matches!(
            cli.command,
            Commands::TestEmail { ref message, .. } if message == "Test message"
        ));
    }
}
