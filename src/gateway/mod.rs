//! # Gateway
//!
//! Serenity client wiring: converts gateway events for the router and sends
//! the router's wire calls over serenity's HTTP client.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Dispatch through the interaction router

pub mod convert;
pub mod handler;
pub mod transport;

use anyhow::{anyhow, Context as _, Result};
use serenity::client::bridge::gateway::ShardManager;
use serenity::prelude::*;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::core::Config;
use crate::interaction::Router;
pub use handler::GatewayHandler;
pub use transport::SerenityTransport;

/// A running gateway connection
pub struct BotSession {
    shard_manager: Arc<Mutex<ShardManager>>,
    task: JoinHandle<Result<(), SerenityError>>,
}

impl BotSession {
    /// Close every shard and wait for the client task to finish
    pub async fn stop(self) -> Result<()> {
        self.shard_manager.lock().await.shutdown_all().await;
        self.wait().await
    }

    /// Wait until the connection ends
    pub async fn wait(self) -> Result<()> {
        self.task
            .await
            .context("gateway task panicked")?
            .map_err(|e| anyhow!("Gateway connection failed: {e}"))
    }
}

pub async fn start(router: Router, config: &Config) -> Result<BotSession> {
    let logger = router.logger().clone();
    let mut intents = GatewayIntents::GUILDS;
    if router.has_message_handler() {
        intents |= GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;
    }

    let handler = GatewayHandler::new(
        Arc::new(router),
        config.command_scope(),
        config.component_ttl,
        config.sweep_interval,
    );
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            logger.error(format_args!("Failed to create Discord client: {e}"));
            anyhow!("Client creation failed: {}", e)
        })?;

    logger.info(format_args!("Gateway intents: {intents:?}"));
    logger.info(format_args!("Establishing WebSocket connection to Discord gateway..."));

    let shard_manager = Arc::clone(&client.shard_manager);
    let task = tokio::spawn(async move { client.start().await });
    Ok(BotSession {
        shard_manager,
        task,
    })
}
