//! Reply context for one interaction
//!
//! Every interaction gets exactly one initial response. The context tracks
//! which reply phase the interaction is in and picks the wire call for each
//! `respond` / `edit` accordingly:
//!
//! | phase            | respond                                   | edit                          |
//! |------------------|-------------------------------------------|-------------------------------|
//! | unacknowledged   | ephemeral message, or update in place for components | same as respond    |
//! | acknowledged     | follow-up (component: ephemeral message)  | edit original (component: update in place) |
//! | responded        | error, unless acknowledged afterwards     | edit original                 |
//! | follow-up mode   | follow-up                                 | edit last follow-up           |
//!
//! Calls are serialized per interaction; wire failures are logged and returned,
//! never retried.

use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::event::{InboundEvent, UserInfo};
use super::payload::MessagePayload;
use crate::components::{ComponentRegistry, FollowupRef, Modal};
use crate::core::{Logger, ResponseError};
use crate::wire::{InteractionResponse, ResponseKind, Transport, WireCall};

/// What kind of interaction the context answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Command,
    Component {
        /// Message the clicked component is attached to
        message_id: String,
        /// Follow-up the component was sent on, when known
        followup: Option<FollowupRef>,
    },
    ModalSubmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPhase {
    Unacknowledged,
    Acknowledged,
    /// `followups` is set once further responses become follow-up messages
    Responded { followups: bool },
    ModalShown,
}

struct ReplyState {
    phase: ReplyPhase,
    /// Last follow-up created, target of `edit` in follow-up mode
    last_followup: Option<String>,
    /// Whether the initial response updated the component's message
    updated_in_place: bool,
    sends: u32,
}

enum Delivery {
    Initial { kind: ResponseKind, ephemeral: bool },
    Followup,
    EditFollowup(String),
    EditOriginal,
}

struct Session {
    id: String,
    token: String,
    user: UserInfo,
    guild_id: Option<String>,
    channel_id: String,
    origin: Origin,
    transport: Arc<dyn Transport>,
    registry: Arc<ComponentRegistry>,
    logger: Logger,
    state: Mutex<ReplyState>,
}

/// Cheap to clone; clones share one reply state
#[derive(Clone)]
pub struct InteractionContext {
    inner: Arc<Session>,
}

impl InteractionContext {
    pub(crate) fn new(
        event: &InboundEvent,
        origin: Origin,
        transport: Arc<dyn Transport>,
        registry: Arc<ComponentRegistry>,
        logger: Logger,
    ) -> Self {
        Self {
            inner: Arc::new(Session {
                id: event.id.clone(),
                token: event.token.clone(),
                user: event.user.clone(),
                guild_id: event.guild_id.clone(),
                channel_id: event.channel_id.clone(),
                origin,
                transport,
                registry,
                logger,
                state: Mutex::new(ReplyState {
                    phase: ReplyPhase::Unacknowledged,
                    last_followup: None,
                    updated_in_place: false,
                    sends: 0,
                }),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn user(&self) -> &UserInfo {
        &self.inner.user
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.inner.guild_id.as_deref()
    }

    pub fn channel_id(&self) -> &str {
        &self.inner.channel_id
    }

    pub fn origin(&self) -> &Origin {
        &self.inner.origin
    }

    /// The follow-up message a clicked component was attached to
    pub fn origin_followup(&self) -> Option<&FollowupRef> {
        match &self.inner.origin {
            Origin::Component { followup, .. } => followup.as_ref(),
            _ => None,
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.inner.logger
    }

    pub async fn phase(&self) -> ReplyPhase {
        self.inner.state.lock().await.phase
    }

    /// Claim more time, or switch an answered interaction to follow-up mode
    ///
    /// Commands get a deferred response. Component and modal callbacks only
    /// record the acknowledgment, which turns the next `respond` into a new
    /// ephemeral message. Repeated calls are no-ops.
    pub async fn acknowledge(&self) -> Result<(), ResponseError> {
        let inner = &self.inner;
        let mut state = inner.state.lock().await;
        match state.phase {
            ReplyPhase::ModalShown => Err(ResponseError::ModalAlreadyShown(inner.id.clone())),
            ReplyPhase::Acknowledged | ReplyPhase::Responded { followups: true } => Ok(()),
            ReplyPhase::Responded { followups: false } => {
                state.phase = ReplyPhase::Responded { followups: true };
                Ok(())
            }
            ReplyPhase::Unacknowledged => {
                if inner.origin == Origin::Command {
                    let response = InteractionResponse::deferred();
                    inner
                        .transport
                        .create_interaction_response(&inner.id, &inner.token, &response)
                        .await
                        .map_err(|cause| {
                            self.wire_failure(WireCall::InteractionResponse(response.kind), cause)
                        })?;
                }
                state.phase = ReplyPhase::Acknowledged;
                inner
                    .logger
                    .debug(format_args!("[{}] ⏳ Acknowledged", inner.id));
                Ok(())
            }
        }
    }

    pub async fn respond(&self, payload: impl Into<MessagePayload>) -> Result<(), ResponseError> {
        let payload = payload.into();
        let inner = &self.inner;
        let mut state = inner.state.lock().await;
        match state.phase {
            ReplyPhase::ModalShown => Err(ResponseError::ModalAlreadyShown(inner.id.clone())),
            ReplyPhase::Responded { followups: false } => {
                Err(ResponseError::AlreadyResponded(inner.id.clone()))
            }
            ReplyPhase::Responded { followups: true } => {
                self.deliver(&mut state, &payload, Delivery::Followup).await
            }
            ReplyPhase::Acknowledged => {
                let delivery = match inner.origin {
                    Origin::Command => Delivery::Followup,
                    Origin::Component { .. } | Origin::ModalSubmit => Delivery::Initial {
                        kind: ResponseKind::ChannelMessage,
                        ephemeral: true,
                    },
                };
                self.deliver(&mut state, &payload, delivery).await?;
                state.phase = ReplyPhase::Responded { followups: true };
                Ok(())
            }
            ReplyPhase::Unacknowledged => {
                let delivery = self.first_response();
                self.deliver(&mut state, &payload, delivery).await?;
                state.phase = ReplyPhase::Responded { followups: false };
                Ok(())
            }
        }
    }

    /// Replace the most recent visible reply
    pub async fn edit(&self, payload: impl Into<MessagePayload>) -> Result<(), ResponseError> {
        let payload = payload.into();
        let inner = &self.inner;
        let mut state = inner.state.lock().await;
        if state.phase == ReplyPhase::ModalShown {
            return Err(ResponseError::ModalAlreadyShown(inner.id.clone()));
        }
        if let Some(message_id) = state.last_followup.clone() {
            return self
                .deliver(&mut state, &payload, Delivery::EditFollowup(message_id))
                .await;
        }
        match state.phase {
            ReplyPhase::Unacknowledged => {
                let delivery = self.first_response();
                self.deliver(&mut state, &payload, delivery).await?;
                state.phase = ReplyPhase::Responded { followups: false };
            }
            ReplyPhase::Acknowledged => {
                let delivery = match inner.origin {
                    Origin::Command => Delivery::EditOriginal,
                    Origin::Component { .. } => Delivery::Initial {
                        kind: ResponseKind::UpdateMessage,
                        ephemeral: false,
                    },
                    Origin::ModalSubmit => Delivery::Initial {
                        kind: ResponseKind::ChannelMessage,
                        ephemeral: true,
                    },
                };
                self.deliver(&mut state, &payload, delivery).await?;
                state.phase = ReplyPhase::Responded { followups: true };
            }
            ReplyPhase::Responded { .. } | ReplyPhase::ModalShown => {
                self.deliver(&mut state, &payload, Delivery::EditOriginal)
                    .await?;
            }
        }
        Ok(())
    }

    /// Answer with a form; only possible as the very first response
    pub async fn modal(&self, modal: Modal) -> Result<(), ResponseError> {
        let inner = &self.inner;
        if inner.origin == Origin::ModalSubmit {
            return Err(ResponseError::ModalNotAllowed {
                interaction: inner.id.clone(),
                reason: "a modal submission cannot open another modal",
            });
        }
        let mut state = inner.state.lock().await;
        match state.phase {
            ReplyPhase::Unacknowledged => {}
            ReplyPhase::ModalShown => {
                return Err(ResponseError::ModalAlreadyShown(inner.id.clone()))
            }
            _ => {
                return Err(ResponseError::ModalNotAllowed {
                    interaction: inner.id.clone(),
                    reason: "the interaction was already acknowledged or answered",
                })
            }
        }

        let rendered = modal.render(&inner.id)?;
        let inline = rendered.inline.is_some();
        if let Some(handler) = rendered.inline {
            inner.registry.register_modal(&inner.id, handler);
        }
        let response = InteractionResponse::modal(rendered.custom_id, rendered.title, rendered.rows);
        if let Err(cause) = inner
            .transport
            .create_interaction_response(&inner.id, &inner.token, &response)
            .await
        {
            if inline {
                inner.registry.take_modal(&inner.id);
            }
            return Err(self.wire_failure(WireCall::InteractionResponse(response.kind), cause));
        }
        state.phase = ReplyPhase::ModalShown;
        Ok(())
    }

    fn first_response(&self) -> Delivery {
        match self.inner.origin {
            Origin::Command => Delivery::Initial {
                kind: ResponseKind::ChannelMessage,
                ephemeral: true,
            },
            Origin::Component { .. } => Delivery::Initial {
                kind: ResponseKind::UpdateMessage,
                ephemeral: false,
            },
            Origin::ModalSubmit => Delivery::Initial {
                kind: ResponseKind::ChannelMessage,
                ephemeral: false,
            },
        }
    }

    /// Render, register inline handles, send, then bind or roll back the handles
    async fn deliver(
        &self,
        state: &mut ReplyState,
        payload: &MessagePayload,
        delivery: Delivery,
    ) -> Result<(), ResponseError> {
        let inner = &self.inner;
        let scope = format!("{}.{}", inner.id, state.sends);
        state.sends += 1;

        let rendered = payload.render(&scope)?;
        let scoped = !rendered.inline.is_empty();
        inner.registry.register_scope(&scope, rendered.inline);
        let body = rendered.body;

        let (call, result) = match &delivery {
            Delivery::Initial { kind, ephemeral } => {
                let body = if *ephemeral { body.ephemeral() } else { body };
                let response = InteractionResponse::message(*kind, body);
                let result = inner
                    .transport
                    .create_interaction_response(&inner.id, &inner.token, &response)
                    .await;
                (WireCall::InteractionResponse(*kind), result.map(|_| None))
            }
            Delivery::Followup => (
                WireCall::CreateFollowup,
                inner.transport.create_followup(&inner.token, &body).await.map(Some),
            ),
            Delivery::EditFollowup(message_id) => (
                WireCall::EditFollowup,
                inner
                    .transport
                    .edit_followup(&inner.token, message_id, &body)
                    .await
                    .map(|_| Some(message_id.clone())),
            ),
            Delivery::EditOriginal => (
                WireCall::EditOriginal,
                inner.transport.edit_original(&inner.token, &body).await.map(|_| None),
            ),
        };

        let followup_id = match result {
            Ok(id) => id,
            Err(cause) => {
                if scoped {
                    inner.registry.remove_scope(&scope);
                }
                return Err(self.wire_failure(call, cause));
            }
        };

        let in_place = matches!(
            delivery,
            Delivery::Initial {
                kind: ResponseKind::UpdateMessage,
                ..
            }
        );
        state.updated_in_place |= in_place;
        if let Some(id) = &followup_id {
            state.last_followup = Some(id.clone());
        }
        if scoped {
            match (&followup_id, &inner.origin) {
                (Some(id), _) => inner.registry.bind_message(
                    &scope,
                    id,
                    Some(FollowupRef {
                        token: inner.token.clone(),
                        message_id: id.clone(),
                    }),
                ),
                (None, Origin::Component { message_id, followup })
                    if in_place || state.updated_in_place =>
                {
                    inner.registry.bind_message(&scope, message_id, followup.clone())
                }
                _ => {}
            }
        }
        inner
            .logger
            .debug(format_args!("[{}] 📤 {}", inner.id, call));
        Ok(())
    }

    fn wire_failure(&self, call: WireCall, cause: anyhow::Error) -> ResponseError {
        self.inner.logger.error(format_args!(
            "[{}] ❌ {} failed: {:#}",
            self.inner.id, call, cause
        ));
        ResponseError::Transport {
            call,
            target: format!("interaction {}", self.inner.id),
            cause,
        }
    }
}

impl fmt::Debug for InteractionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionContext")
            .field("id", &self.inner.id)
            .field("origin", &self.inner.origin)
            .field("user", &self.inner.user.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Button, ButtonStyle, ModalInput, TextInputStyle};
    use crate::core::logging::testing::{capturing_logger, CapturingLog};
    use crate::interaction::event::{CommandData, EventKind};
    use crate::wire::testing::{Call, RecordingTransport};
    use log::Level;

    struct Fixture {
        transport: Arc<RecordingTransport>,
        registry: Arc<ComponentRegistry>,
        sink: Arc<CapturingLog>,
    }

    impl Fixture {
        fn new() -> Self {
            let (_, sink) = capturing_logger();
            Self {
                transport: Arc::new(RecordingTransport::new()),
                registry: Arc::new(ComponentRegistry::default()),
                sink,
            }
        }

        fn context(&self, origin: Origin) -> InteractionContext {
            let event = InboundEvent {
                id: "100".into(),
                token: "tok".into(),
                user: UserInfo::new("7", "tester"),
                guild_id: Some("1".into()),
                channel_id: "2".into(),
                kind: EventKind::ApplicationCommand(CommandData::default()),
            };
            InteractionContext::new(
                &event,
                origin,
                self.transport.clone(),
                self.registry.clone(),
                Logger::new(self.sink.clone()),
            )
        }
    }

    fn component() -> Origin {
        Origin::Component {
            message_id: "m0".into(),
            followup: None,
        }
    }

    #[tokio::test]
    async fn test_command_respond_is_ephemeral() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::Command);
        ctx.respond("hi").await.unwrap();

        let calls = fx.transport.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Initial { response, .. } => {
                assert_eq!(response.kind, ResponseKind::ChannelMessage);
                assert!(response.is_ephemeral());
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(
            ctx.phase().await,
            ReplyPhase::Responded { followups: false }
        );
    }

    #[tokio::test]
    async fn test_second_respond_without_acknowledge_fails() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::Command);
        ctx.respond("one").await.unwrap();
        let err = ctx.respond("two").await.unwrap_err();
        assert!(matches!(err, ResponseError::AlreadyResponded(_)));
        assert_eq!(fx.transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_acknowledge_is_idempotent() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::Command);
        ctx.acknowledge().await.unwrap();
        ctx.acknowledge().await.unwrap();
        assert_eq!(fx.transport.calls().len(), 1);
        assert_eq!(
            fx.transport.initial_kinds(),
            vec![ResponseKind::DeferredChannelMessage]
        );
    }

    #[tokio::test]
    async fn test_acknowledge_then_edit_edits_original() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::Command);
        ctx.acknowledge().await.unwrap();
        ctx.edit("Hello! You said hi").await.unwrap();

        let calls = fx.transport.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[1], Call::EditOriginal { body, .. }
            if body.content.as_deref() == Some("Hello! You said hi")));
    }

    #[tokio::test]
    async fn test_exactly_one_initial_response_across_mixed_calls() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::Command);
        ctx.acknowledge().await.unwrap();
        ctx.respond("a").await.unwrap();
        ctx.respond("b").await.unwrap();
        ctx.edit("b2").await.unwrap();
        ctx.acknowledge().await.unwrap();
        ctx.respond("c").await.unwrap();
        assert!(ctx.modal(
            Modal::route("t", "form", "").input(ModalInput::new("x", TextInputStyle::Short))
        )
        .await
        .is_err());

        assert_eq!(fx.transport.initial_count(), 1);
        let calls = fx.transport.calls();
        let followups = calls
            .iter()
            .filter(|c| matches!(c, Call::CreateFollowup { .. }))
            .count();
        assert_eq!(followups, 3);
        assert!(matches!(&calls[3], Call::EditFollowup { message_id, .. } if message_id == "m2"));
    }

    #[tokio::test]
    async fn test_acknowledge_after_respond_enables_followups() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::Command);
        ctx.respond("first").await.unwrap();
        ctx.acknowledge().await.unwrap();
        ctx.respond("second").await.unwrap();

        let calls = fx.transport.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[1], Call::CreateFollowup { .. }));
    }

    #[tokio::test]
    async fn test_component_respond_updates_in_place() {
        let fx = Fixture::new();
        let ctx = fx.context(component());
        ctx.respond("updated").await.unwrap();
        assert_eq!(fx.transport.initial_kinds(), vec![ResponseKind::UpdateMessage]);
        assert!(!matches!(&fx.transport.calls()[0], Call::Initial { response, .. } if response.is_ephemeral()));
    }

    #[tokio::test]
    async fn test_component_acknowledge_suppresses_update() {
        let fx = Fixture::new();
        let ctx = fx.context(component());
        ctx.acknowledge().await.unwrap();
        assert!(fx.transport.calls().is_empty());

        ctx.respond("new message").await.unwrap();
        ctx.respond("another").await.unwrap();
        assert_eq!(fx.transport.initial_kinds(), vec![ResponseKind::ChannelMessage]);
        assert!(matches!(&fx.transport.calls()[1], Call::CreateFollowup { .. }));
    }

    #[tokio::test]
    async fn test_modal_submit_response_is_public() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::ModalSubmit);
        ctx.respond("thanks").await.unwrap();
        match &fx.transport.calls()[0] {
            Call::Initial { response, .. } => {
                assert_eq!(response.kind, ResponseKind::ChannelMessage);
                assert!(!response.is_ephemeral());
            }
            other => panic!("unexpected call {other:?}"),
        }
        let err = ctx
            .modal(Modal::route("t", "form", "").input(ModalInput::new("x", TextInputStyle::Short)))
            .await
            .unwrap_err();
        assert!(matches!(err, ResponseError::ModalNotAllowed { .. }));
    }

    #[tokio::test]
    async fn test_modal_submit_acknowledge_keeps_reply_private() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::ModalSubmit);
        ctx.acknowledge().await.unwrap();
        ctx.acknowledge().await.unwrap();
        assert!(fx.transport.calls().is_empty());
        assert_eq!(ctx.phase().await, ReplyPhase::Acknowledged);

        ctx.respond("done").await.unwrap();
        ctx.respond("and more").await.unwrap();

        let calls = fx.transport.calls();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            Call::Initial { response, .. } => {
                assert_eq!(response.kind, ResponseKind::ChannelMessage);
                assert!(response.is_ephemeral());
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert!(matches!(&calls[1], Call::CreateFollowup { .. }));
        assert_eq!(fx.transport.initial_count(), 1);
    }

    #[tokio::test]
    async fn test_modal_submit_acknowledge_then_edit_is_private() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::ModalSubmit);
        ctx.acknowledge().await.unwrap();
        ctx.edit("saved").await.unwrap();

        match &fx.transport.calls()[0] {
            Call::Initial { response, .. } => {
                assert_eq!(response.kind, ResponseKind::ChannelMessage);
                assert!(response.is_ephemeral());
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_modal_registers_single_use_handle() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::Command);
        ctx.modal(
            Modal::new("Form", |_ctx, _values| async { Ok(()) })
                .input(ModalInput::new("Name", TextInputStyle::Short)),
        )
        .await
        .unwrap();

        assert_eq!(fx.transport.initial_kinds(), vec![ResponseKind::Modal]);
        assert_eq!(fx.registry.pending_modals(), 1);
        assert!(matches!(
            ctx.respond("x").await,
            Err(ResponseError::ModalAlreadyShown(_))
        ));
        assert!(matches!(
            ctx.acknowledge().await,
            Err(ResponseError::ModalAlreadyShown(_))
        ));
        assert_eq!(fx.transport.initial_count(), 1);
    }

    #[tokio::test]
    async fn test_modal_after_acknowledge_rejected() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::Command);
        ctx.acknowledge().await.unwrap();
        let err = ctx
            .modal(Modal::route("t", "form", "").input(ModalInput::new("x", TextInputStyle::Short)))
            .await
            .unwrap_err();
        assert!(matches!(err, ResponseError::ModalNotAllowed { .. }));
    }

    #[tokio::test]
    async fn test_wire_failure_is_logged_and_returned() {
        let fx = Fixture::new();
        fx.transport.fail_all(true);
        let ctx = fx.context(Origin::Command);
        let err = ctx
            .respond(MessagePayload::text("hi").row([
                Button::new("go", ButtonStyle::Primary).on_click(|_ctx| async { Ok(()) }),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResponseError::Transport {
                call: WireCall::InteractionResponse(ResponseKind::ChannelMessage),
                ..
            }
        ));
        assert!(fx.sink.contains(Level::Error, "[100]"));
        assert!(fx.sink.contains(Level::Error, "channel message"));
        assert_eq!(fx.transport.calls().len(), 1);
        assert_eq!(fx.registry.scoped_len(), 0);
        assert_eq!(ctx.phase().await, ReplyPhase::Unacknowledged);
    }

    #[tokio::test]
    async fn test_followup_components_bound_to_followup() {
        let fx = Fixture::new();
        let ctx = fx.context(Origin::Command);
        ctx.acknowledge().await.unwrap();
        ctx.respond(MessagePayload::text("pick").row([
            Button::new("go", ButtonStyle::Primary).on_click(|_ctx| async { Ok(()) }),
        ]))
        .await
        .unwrap();

        let found = fx.registry.lookup_scoped("100.0", "0", "m1").unwrap();
        assert_eq!(
            found.followup,
            Some(FollowupRef {
                token: "tok".into(),
                message_id: "m1".into()
            })
        );
    }
}
