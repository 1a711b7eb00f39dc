//! Reply context for plain channel messages
//!
//! Acknowledging shows the typing indicator once. Responses are sent as
//! replies referencing the triggering message.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::event::{MessageEvent, UserInfo};
use super::payload::MessagePayload;
use crate::commands::HandlerFuture;
use crate::components::ComponentRegistry;
use crate::core::{Logger, ResponseError};
use crate::wire::{MessageReference, Transport, WireCall};

pub type MessageHandlerFn = Arc<dyn Fn(MessageContext) -> HandlerFuture + Send + Sync>;

pub fn message_handler<F, Fut>(f: F) -> MessageHandlerFn
where
    F: Fn(MessageContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)) as HandlerFuture)
}

#[derive(Default)]
struct MessageState {
    typing_shown: bool,
    last_sent: Option<String>,
    sends: u32,
}

struct MessageSession {
    event: MessageEvent,
    transport: Arc<dyn Transport>,
    registry: Arc<ComponentRegistry>,
    logger: Logger,
    state: Mutex<MessageState>,
}

#[derive(Clone)]
pub struct MessageContext {
    inner: Arc<MessageSession>,
}

impl MessageContext {
    pub(crate) fn new(
        event: MessageEvent,
        transport: Arc<dyn Transport>,
        registry: Arc<ComponentRegistry>,
        logger: Logger,
    ) -> Self {
        Self {
            inner: Arc::new(MessageSession {
                event,
                transport,
                registry,
                logger,
                state: Mutex::new(MessageState::default()),
            }),
        }
    }

    pub fn message(&self) -> &MessageEvent {
        &self.inner.event
    }

    pub fn content(&self) -> &str {
        &self.inner.event.content
    }

    pub fn author(&self) -> &UserInfo {
        &self.inner.event.author
    }

    pub fn channel_id(&self) -> &str {
        &self.inner.event.channel_id
    }

    pub fn logger(&self) -> &Logger {
        &self.inner.logger
    }

    /// Show the typing indicator; only the first call reaches the platform
    pub async fn acknowledge(&self) -> Result<(), ResponseError> {
        let mut state = self.inner.state.lock().await;
        if state.typing_shown {
            return Ok(());
        }
        self.inner
            .transport
            .broadcast_typing(&self.inner.event.channel_id)
            .await
            .map_err(|cause| self.wire_failure(WireCall::Typing, cause))?;
        state.typing_shown = true;
        Ok(())
    }

    /// Reply to the triggering message
    pub async fn respond(&self, payload: impl Into<MessagePayload>) -> Result<(), ResponseError> {
        let payload = payload.into();
        let inner = &self.inner;
        let mut state = inner.state.lock().await;

        let scope = format!("{}.{}", inner.event.id, state.sends);
        state.sends += 1;
        let rendered = payload.render(&scope)?;
        let scoped = !rendered.inline.is_empty();
        inner.registry.register_scope(&scope, rendered.inline);

        let mut body = rendered.body;
        body.message_reference = Some(MessageReference {
            message_id: inner.event.id.clone(),
            channel_id: inner.event.channel_id.clone(),
            guild_id: inner.event.guild_id.clone(),
        });

        match inner.transport.send_message(&inner.event.channel_id, &body).await {
            Ok(message_id) => {
                if scoped {
                    inner.registry.bind_message(&scope, &message_id, None);
                }
                state.last_sent = Some(message_id);
                Ok(())
            }
            Err(cause) => {
                if scoped {
                    inner.registry.remove_scope(&scope);
                }
                Err(self.wire_failure(WireCall::SendMessage, cause))
            }
        }
    }

    /// Edit the last reply sent through this context
    pub async fn edit(&self, payload: impl Into<MessagePayload>) -> Result<(), ResponseError> {
        let payload = payload.into();
        let inner = &self.inner;
        let mut state = inner.state.lock().await;
        let Some(message_id) = state.last_sent.clone() else {
            return Err(ResponseError::NothingToEdit(inner.event.id.clone()));
        };

        let scope = format!("{}.{}", inner.event.id, state.sends);
        state.sends += 1;
        let rendered = payload.render(&scope)?;
        let scoped = !rendered.inline.is_empty();
        inner.registry.register_scope(&scope, rendered.inline);

        match inner
            .transport
            .edit_message(&inner.event.channel_id, &message_id, &rendered.body)
            .await
        {
            Ok(()) => {
                if scoped {
                    inner.registry.bind_message(&scope, &message_id, None);
                }
                Ok(())
            }
            Err(cause) => {
                if scoped {
                    inner.registry.remove_scope(&scope);
                }
                Err(self.wire_failure(WireCall::EditMessage, cause))
            }
        }
    }

    fn wire_failure(&self, call: WireCall, cause: anyhow::Error) -> ResponseError {
        self.inner.logger.error(format_args!(
            "[{}] ❌ {} failed: {:#}",
            self.inner.event.id, call, cause
        ));
        ResponseError::Transport {
            call,
            target: format!("message {}", self.inner.event.id),
            cause,
        }
    }
}
