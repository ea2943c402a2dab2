//! Tomon bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p tomon-gateway --bin tomon-bot
//! ```
//!
//! Configuration is loaded from environment variables.

use std::sync::Arc;
use tomon_common::{try_init_tracing, BotConfig, TracingConfig};
use tomon_gateway::{Bot, GatewayEvent, Handler};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load configuration
    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    if let Err(e) = try_init_tracing(&TracingConfig::for_env(config.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "Bot stopped");
        std::process::exit(1);
    }
}

async fn run(config: BotConfig) -> anyhow::Result<()> {
    info!(env = ?config.env, gateway = %config.gateway_url, "Starting Tomon bot...");

    let bot = Bot::new(config)?;

    bot.before(
        &["message", "notice", "other"],
        Handler::unit(|event: Arc<GatewayEvent>| async move {
            info!(
                event = event.name(),
                channel_id = event.context.channel_id.as_deref().unwrap_or("-"),
                "Inbound event"
            );
            Ok(())
        }),
    )?;

    tokio::select! {
        result = bot.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    Ok(())
}
