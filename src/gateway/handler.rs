//! Serenity event handler feeding the router

use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, GuildId, MessageId};
use serenity::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::convert::{inbound_event, message_event};
use super::transport::SerenityTransport;
use crate::interaction::Router;
use crate::wire::{CommandScope, Transport};

pub struct GatewayHandler {
    router: Arc<Router>,
    scope: CommandScope,
    component_ttl: Duration,
    sweep_interval: Duration,
    sweeper_started: AtomicBool,
}

impl GatewayHandler {
    pub fn new(
        router: Arc<Router>,
        scope: CommandScope,
        component_ttl: Duration,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            router,
            scope,
            component_ttl,
            sweep_interval,
            sweeper_started: AtomicBool::new(false),
        }
    }

    fn transport(ctx: &Context) -> Arc<dyn Transport> {
        Arc::new(SerenityTransport::new(Arc::clone(&ctx.http)))
    }

    /// Periodically evict component and modal handles older than the TTL
    fn spawn_sweeper(&self) {
        if self.sweeper_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let registry = Arc::clone(self.router.components());
        let logger = self.router.logger().clone();
        let ttl = self.component_ttl;
        let every = self.sweep_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let evicted = registry.evict_expired(ttl);
                if evicted > 0 {
                    logger.debug(format_args!("🧹 Evicted {evicted} expired component handles"));
                }
            }
        });
    }
}

#[async_trait]
impl EventHandler for GatewayHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let logger = self.router.logger();
        logger.info(format_args!("🎉 {} is connected and ready!", ready.user.name));
        logger.info(format_args!("📡 Connected to {} guilds", ready.guilds.len()));

        ctx.http.set_application_id(ready.application.id.0);
        let transport = Self::transport(&ctx);
        // Failure is already logged by the router; dispatch still works for
        // commands registered earlier
        let _ = self
            .router
            .register_commands(transport.as_ref(), self.scope)
            .await;

        self.spawn_sweeper();
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Some(event) = inbound_event(&interaction) else {
            return;
        };
        self.router.dispatch(Self::transport(&ctx), event).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || !self.router.has_message_handler() {
            return;
        }
        self.router
            .dispatch_message(Self::transport(&ctx), message_event(&msg))
            .await;
    }

    async fn message_delete(
        &self,
        _ctx: Context,
        _channel_id: ChannelId,
        deleted_message_id: MessageId,
        _guild_id: Option<GuildId>,
    ) {
        self.router
            .components()
            .forget_message(&deleted_message_id.to_string());
    }

    async fn message_delete_bulk(
        &self,
        _ctx: Context,
        _channel_id: ChannelId,
        deleted_message_ids: Vec<MessageId>,
        _guild_id: Option<GuildId>,
    ) {
        for id in deleted_message_ids {
            self.router.components().forget_message(&id.to_string());
        }
    }
}
