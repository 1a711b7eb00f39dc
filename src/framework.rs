//! # Framework Builder
//!
//! Collects commands, component handlers, middleware and the message handler
//! before the session starts, then freezes them into a `Router`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//! - **Toggleable**: false

use std::future::Future;

use crate::commands::{CommandNode, CommandRegistry};
use crate::components::{ComponentRegistry, HandlerTable};
use crate::core::{Config, Logger, RegistrationError};
use crate::gateway::{self, BotSession};
use crate::interaction::message::message_handler;
use crate::interaction::{
    InteractionContext, MessageContext, MessageHandlerFn, MiddlewareChain, Router,
};

#[derive(Default)]
pub struct Framework {
    commands: CommandRegistry,
    handlers: HandlerTable,
    middleware: MiddlewareChain,
    gate_components: bool,
    message_handler: Option<MessageHandlerFn>,
    logger: Option<Logger>,
}

impl Framework {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route framework logging through `logger` instead of the global backend
    pub fn set_logger(&mut self, logger: Logger) {
        self.logger = Some(logger);
    }

    /// Validate and add a top-level command; a repeated name replaces the earlier one
    pub fn register_command(
        &mut self,
        command: impl Into<CommandNode>,
    ) -> Result<(), RegistrationError> {
        self.commands.register(command)
    }

    /// Handle buttons whose custom id is `<id>|<params>`
    pub fn add_button_handler<F, Fut>(&mut self, id: &str, f: F) -> Result<(), RegistrationError>
    where
        F: Fn(InteractionContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.handlers.add_button(id, f)
    }

    pub fn add_select_handler<F, Fut>(&mut self, id: &str, f: F) -> Result<(), RegistrationError>
    where
        F: Fn(InteractionContext, String, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.handlers.add_select(id, f)
    }

    pub fn add_modal_handler<F, Fut>(&mut self, id: &str, f: F) -> Result<(), RegistrationError>
    where
        F: Fn(InteractionContext, String, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.handlers.add_modal(id, f)
    }

    /// Append a guard; guards run in the order they were added
    pub fn add_middleware<F, Fut>(&mut self, guard: F)
    where
        F: Fn(InteractionContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.middleware.push(guard);
    }

    /// Also run middleware for component and modal interactions
    pub fn gate_components(&mut self, gate: bool) {
        self.gate_components = gate;
    }

    pub fn set_message_handler<F, Fut>(&mut self, f: F)
    where
        F: Fn(MessageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.message_handler = Some(message_handler(f));
    }

    pub fn build(self) -> Router {
        Router::new(
            self.commands,
            ComponentRegistry::new(self.handlers),
            self.middleware,
            self.gate_components,
            self.message_handler,
            self.logger.unwrap_or_default(),
        )
    }

    /// Connect to the gateway and dispatch events until stopped
    pub async fn start(self, config: &Config) -> anyhow::Result<BotSession> {
        gateway::start(self.build(), config).await
    }
}
