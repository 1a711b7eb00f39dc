//! Interaction dispatch
//!
//! The router owns every table built at startup and is shared read-only
//! between the per-event tasks the gateway spawns. Scoped component and modal
//! handles live in the `ComponentRegistry`, which is safe for concurrent use.
//!
//! Events with no matching handler are dropped without a response. Handler
//! errors are logged and never retried.

use std::sync::Arc;

use super::context::{InteractionContext, Origin};
use super::event::{
    CommandData, ComponentData, EventKind, InboundEvent, MessageEvent, ModalSubmitData,
};
use super::message::{MessageContext, MessageHandlerFn};
use super::middleware::MiddlewareChain;
use crate::commands::autocomplete::truncate_suggestions;
use crate::commands::{decode_arguments, decode_value, ArgValue, AutocompleteContext, Choice, CommandRegistry};
use crate::components::{ComponentRegistry, CustomId};
use crate::core::{Logger, ResponseError};
use crate::wire::{ApplicationCommand, CommandScope, InteractionResponse, Transport, WireCall};

/// What happened to a dispatched event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    /// No handler matched
    Dropped,
    /// A middleware guard refused the event
    Denied,
    /// The handler or the autocomplete reply returned an error
    Failed,
}

pub struct Router {
    commands: CommandRegistry,
    components: Arc<ComponentRegistry>,
    middleware: MiddlewareChain,
    gate_components: bool,
    message_handler: Option<MessageHandlerFn>,
    logger: Logger,
}

impl Router {
    pub(crate) fn new(
        commands: CommandRegistry,
        components: ComponentRegistry,
        middleware: MiddlewareChain,
        gate_components: bool,
        message_handler: Option<MessageHandlerFn>,
        logger: Logger,
    ) -> Self {
        Self {
            commands,
            components: Arc::new(components),
            middleware,
            gate_components,
            message_handler,
            logger,
        }
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn components(&self) -> &Arc<ComponentRegistry> {
        &self.components
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn has_message_handler(&self) -> bool {
        self.message_handler.is_some()
    }

    pub fn command_payloads(&self) -> Vec<ApplicationCommand> {
        self.commands.payloads()
    }

    /// Overwrite the platform's command list for `scope` with the local one
    pub async fn register_commands(
        &self,
        transport: &dyn Transport,
        scope: CommandScope,
    ) -> Result<usize, ResponseError> {
        let payloads = self.command_payloads();
        transport
            .register_commands(scope, &payloads)
            .await
            .map_err(|cause| {
                self.logger.error(format_args!(
                    "❌ Failed to register {} commands ({scope:?}): {cause:#}",
                    payloads.len()
                ));
                ResponseError::Transport {
                    call: WireCall::RegisterCommands,
                    target: format!("{scope:?}"),
                    cause,
                }
            })?;
        self.logger.info(format_args!(
            "✅ Registered {} commands ({scope:?})",
            payloads.len()
        ));
        Ok(payloads.len())
    }

    pub async fn dispatch(&self, transport: Arc<dyn Transport>, event: InboundEvent) -> Outcome {
        match &event.kind {
            EventKind::ApplicationCommand(data) => self.run_command(transport, &event, data).await,
            EventKind::ApplicationCommandAutocomplete(data) => {
                self.run_autocomplete(transport.as_ref(), &event, data).await
            }
            EventKind::MessageComponent(data) => self.run_component(transport, &event, data).await,
            EventKind::ModalSubmit(data) => self.run_modal(transport, &event, data).await,
        }
    }

    pub async fn dispatch_message(
        &self,
        transport: Arc<dyn Transport>,
        event: MessageEvent,
    ) -> Outcome {
        if event.author.bot {
            return Outcome::Dropped;
        }
        let Some(handler) = &self.message_handler else {
            return Outcome::Dropped;
        };
        let id = event.id.clone();
        let ctx = MessageContext::new(
            event,
            transport,
            Arc::clone(&self.components),
            self.logger.clone(),
        );
        self.finish(&id, "message handler", handler(ctx).await)
    }

    fn context(
        &self,
        event: &InboundEvent,
        origin: Origin,
        transport: Arc<dyn Transport>,
    ) -> InteractionContext {
        InteractionContext::new(
            event,
            origin,
            transport,
            Arc::clone(&self.components),
            self.logger.clone(),
        )
    }

    fn dropped(&self, event: &InboundEvent, what: &str) -> Outcome {
        self.logger.debug(format_args!(
            "[{}] ⏭️ No handler for {} {}",
            event.id,
            event.kind.label(),
            what
        ));
        Outcome::Dropped
    }

    fn finish(&self, id: &str, target: &str, result: anyhow::Result<()>) -> Outcome {
        match result {
            Ok(()) => Outcome::Handled,
            Err(e) => {
                self.logger
                    .error(format_args!("[{id}] ❌ {target} failed: {e:#}"));
                Outcome::Failed
            }
        }
    }

    async fn run_command(
        &self,
        transport: Arc<dyn Transport>,
        event: &InboundEvent,
        data: &CommandData,
    ) -> Outcome {
        let Some(resolved) = self.commands.resolve(&data.name, &data.options) else {
            return self.dropped(event, &format!("/{}", data.name));
        };
        self.logger.info(format_args!(
            "[{}] 📥 /{} from {} ({})",
            event.id, resolved.path, event.user.name, event.user.id
        ));

        let args = decode_arguments(&resolved.leaf.options, resolved.options, &data.resolved);
        let ctx = self.context(event, Origin::Command, transport);
        if !self.middleware.allows(&ctx, &resolved.path).await {
            self.logger
                .debug(format_args!("[{}] 🚫 /{} denied", event.id, resolved.path));
            return Outcome::Denied;
        }
        let handler = Arc::clone(resolved.leaf.handler());
        let target = format!("/{}", resolved.path);
        self.finish(&event.id, &target, handler(ctx, args).await)
    }

    async fn run_autocomplete(
        &self,
        transport: &dyn Transport,
        event: &InboundEvent,
        data: &CommandData,
    ) -> Outcome {
        let Some(resolved) = self.commands.resolve(&data.name, &data.options) else {
            return self.dropped(event, &format!("/{}", data.name));
        };
        let focused = resolved.options.iter().find(|o| o.focused);
        let declared = focused.and_then(|f| resolved.leaf.options.iter().find(|o| o.name == f.name));
        let (Some(focused), Some(option)) = (focused, declared) else {
            return self.dropped(event, &resolved.path);
        };
        let Some(callback) = option.autocomplete.clone() else {
            return self.dropped(event, &format!("{} {}", resolved.path, option.name));
        };

        // Partial input that does not parse as the declared kind is passed as text
        let value = match focused.value.as_ref() {
            Some(raw) => match decode_value(option.kind, raw, &data.resolved) {
                ArgValue::Null => raw
                    .as_str()
                    .map(|s| ArgValue::String(s.to_string()))
                    .unwrap_or(ArgValue::Null),
                decoded => decoded,
            },
            None => ArgValue::Null,
        };
        let ctx = AutocompleteContext {
            interaction_id: event.id.clone(),
            user: event.user.clone(),
            guild_id: event.guild_id.clone(),
            channel_id: event.channel_id.clone(),
            command: resolved.path.clone(),
            option: option.name.clone(),
            arguments: decode_arguments(&resolved.leaf.options, resolved.options, &data.resolved),
        };

        let mut choices = callback(ctx, value).await;
        let dropped = truncate_suggestions(&mut choices);
        if dropped > 0 {
            self.logger.warn(format_args!(
                "[{}] ⚠️ Autocomplete for /{} returned {} extra choices, truncated",
                event.id, resolved.path, dropped
            ));
        }

        let response =
            InteractionResponse::autocomplete(choices.iter().map(Choice::to_wire).collect());
        match transport
            .create_interaction_response(&event.id, &event.token, &response)
            .await
        {
            Ok(()) => Outcome::Handled,
            Err(e) => {
                self.logger.error(format_args!(
                    "[{}] ❌ {} failed: {e:#}",
                    event.id,
                    WireCall::InteractionResponse(response.kind)
                ));
                Outcome::Failed
            }
        }
    }

    async fn run_component(
        &self,
        transport: Arc<dyn Transport>,
        event: &InboundEvent,
        data: &ComponentData,
    ) -> Outcome {
        let id = CustomId::parse(&data.custom_id);
        let found = match id.scope() {
            Some(scope) => self
                .components
                .lookup_scoped(scope, &id.params, &data.message_id)
                .map(|m| (m.handler, m.followup)),
            None => self
                .components
                .table()
                .component(&id.handler)
                .map(|h| (h.clone(), None)),
        };
        let Some((handler, followup)) = found else {
            return self.dropped(event, &data.custom_id);
        };
        self.logger.info(format_args!(
            "[{}] 🖱️ {} {} from {} ({})",
            event.id,
            handler.label(),
            id.handler,
            event.user.name,
            event.user.id
        ));

        let origin = Origin::Component {
            message_id: data.message_id.clone(),
            followup,
        };
        let ctx = self.context(event, origin, transport);
        if self.gate_components && !self.middleware.allows(&ctx, &id.handler).await {
            self.logger
                .debug(format_args!("[{}] 🚫 {} denied", event.id, id.handler));
            return Outcome::Denied;
        }
        let result = handler
            .call(ctx, id.params.clone(), data.values.clone())
            .await;
        self.finish(&event.id, &id.handler, result)
    }

    async fn run_modal(
        &self,
        transport: Arc<dyn Transport>,
        event: &InboundEvent,
        data: &ModalSubmitData,
    ) -> Outcome {
        let id = CustomId::parse(&data.custom_id);
        let known = match id.scope() {
            Some(origin_interaction) => self.components.has_modal(origin_interaction),
            None => self.components.table().modal(&id.handler).is_some(),
        };
        if !known {
            return self.dropped(event, &data.custom_id);
        }
        self.logger.info(format_args!(
            "[{}] 📝 modal {} from {} ({})",
            event.id, id.handler, event.user.name, event.user.id
        ));

        let ctx = self.context(event, Origin::ModalSubmit, transport);
        if self.gate_components && !self.middleware.allows(&ctx, &id.handler).await {
            self.logger
                .debug(format_args!("[{}] 🚫 {} denied", event.id, id.handler));
            return Outcome::Denied;
        }
        // single-use handles are only consumed once the guards let the submission through
        let handler = match id.scope() {
            Some(origin_interaction) => self.components.take_modal(origin_interaction),
            None => self.components.table().modal(&id.handler).cloned(),
        };
        let Some(handler) = handler else {
            return self.dropped(event, &data.custom_id);
        };
        let result = handler(ctx, id.params.clone(), data.values()).await;
        self.finish(&event.id, &id.handler, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandGroup, CommandOption, OptionKind, SlashCommand};
    use crate::commands::options::{SUBCOMMAND, SUBCOMMAND_GROUP};
    use crate::components::handler::inline_values;
    use crate::components::{Button, ButtonStyle, Modal, ModalInput, TextInputStyle};
    use crate::core::logging::testing::capturing_logger;
    use crate::interaction::event::{ModalField, RawOption, UserInfo};
    use crate::interaction::payload::MessagePayload;
    use crate::wire::testing::{Call, RecordingTransport};
    use crate::wire::ResponseKind;
    use crate::Framework;
    use log::Level;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    type Seen = Arc<Mutex<Vec<String>>>;

    fn event(id: &str, kind: EventKind) -> InboundEvent {
        InboundEvent {
            id: id.into(),
            token: format!("tok-{id}"),
            user: UserInfo::new("u1", "tester"),
            guild_id: Some("g1".into()),
            channel_id: "c1".into(),
            kind,
        }
    }

    fn command(id: &str, name: &str, options: Vec<RawOption>) -> InboundEvent {
        event(
            id,
            EventKind::ApplicationCommand(CommandData {
                name: name.into(),
                options,
                ..CommandData::default()
            }),
        )
    }

    fn click(id: &str, custom_id: &str, message_id: &str) -> InboundEvent {
        event(
            id,
            EventKind::MessageComponent(ComponentData {
                custom_id: custom_id.into(),
                values: Vec::new(),
                message_id: message_id.into(),
            }),
        )
    }

    fn submit(id: &str, custom_id: &str, values: &[&str]) -> InboundEvent {
        event(
            id,
            EventKind::ModalSubmit(ModalSubmitData {
                custom_id: custom_id.into(),
                fields: values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| ModalField {
                        custom_id: i.to_string(),
                        value: v.to_string(),
                    })
                    .collect(),
            }),
        )
    }

    fn transport() -> (Arc<RecordingTransport>, Arc<dyn Transport>) {
        let recording = Arc::new(RecordingTransport::new());
        let shared: Arc<dyn Transport> = recording.clone();
        (recording, shared)
    }

    #[tokio::test]
    async fn test_nested_command_receives_arguments() {
        let seen: Seen = Arc::default();
        let mut framework = Framework::new();
        let record = seen.clone();
        framework
            .register_command(
                CommandGroup::new("test", "testing").child(
                    CommandGroup::new("subtest", "nested").child(
                        SlashCommand::new("subsubtest", "deepest", move |ctx, args| {
                            let record = record.clone();
                            async move {
                                record.lock().unwrap().push(args[0].to_string());
                                ctx.acknowledge().await?;
                                ctx.edit(format!("Hello! You said {}", args[0])).await?;
                                Ok(())
                            }
                        })
                        .option(CommandOption::new("val", "value", OptionKind::String, true)),
                    ),
                ),
            )
            .unwrap();
        let router = framework.build();
        let (recording, shared) = transport();

        let raw = vec![RawOption::nested(
            "subtest",
            SUBCOMMAND_GROUP,
            vec![RawOption::nested(
                "subsubtest",
                SUBCOMMAND,
                vec![RawOption::value("val", 3, json!("hi"))],
            )],
        )];
        let outcome = router.dispatch(shared, command("1", "test", raw)).await;

        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(*seen.lock().unwrap(), vec!["hi".to_string()]);
        assert_eq!(
            recording.initial_kinds(),
            vec![ResponseKind::DeferredChannelMessage]
        );
        assert!(matches!(&recording.calls()[1], Call::EditOriginal { body, .. }
            if body.content.as_deref() == Some("Hello! You said hi")));
    }

    #[tokio::test]
    async fn test_unknown_events_dropped_silently() {
        let router = Framework::new().build();
        let (recording, shared) = transport();

        assert_eq!(
            router.dispatch(shared.clone(), command("1", "nope", Vec::new())).await,
            Outcome::Dropped
        );
        assert_eq!(
            router.dispatch(shared.clone(), click("2", "missing|x", "m")).await,
            Outcome::Dropped
        );
        assert_eq!(
            router.dispatch(shared, submit("3", "~999", &["a"])).await,
            Outcome::Dropped
        );
        assert!(recording.calls().is_empty());
    }

    #[tokio::test]
    async fn test_button_params_reach_handler() {
        let seen: Seen = Arc::default();
        let record = seen.clone();
        let mut framework = Framework::new();
        framework
            .add_button_handler("click", move |ctx, params| {
                let record = record.clone();
                async move {
                    record.lock().unwrap().push(params.clone());
                    ctx.respond(format!("Clicked by {}", params)).await?;
                    Ok(())
                }
            })
            .unwrap();
        let router = framework.build();
        let (recording, shared) = transport();

        let outcome = router.dispatch(shared, click("5", "click|u123", "m0")).await;
        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(*seen.lock().unwrap(), vec!["u123".to_string()]);
        assert_eq!(recording.initial_kinds(), vec![ResponseKind::UpdateMessage]);
    }

    #[tokio::test]
    async fn test_button_params_identify_owner() {
        let mut framework = Framework::new();
        framework
            .add_button_handler("click", |ctx, owner| async move {
                if ctx.user().id == owner {
                    ctx.respond("Clicked!").await?;
                } else {
                    ctx.acknowledge().await?;
                    ctx.respond("That button isn't yours").await?;
                }
                Ok(())
            })
            .unwrap();
        let router = framework.build();
        let (recording, shared) = transport();

        let mut owner = click("5", "click|u123", "m0");
        owner.user = UserInfo::new("u123", "owner");
        let mut stranger = click("6", "click|u123", "m0");
        stranger.user = UserInfo::new("u999", "stranger");

        assert_eq!(router.dispatch(shared.clone(), owner).await, Outcome::Handled);
        assert_eq!(router.dispatch(shared, stranger).await, Outcome::Handled);

        let calls = recording.calls();
        assert_eq!(calls.len(), 2);
        match (&calls[0], &calls[1]) {
            (
                Call::Initial {
                    interaction_id: first,
                    response: updated,
                },
                Call::Initial {
                    interaction_id: second,
                    response: private,
                },
            ) => {
                assert_eq!(first, "5");
                assert_eq!(updated.kind, ResponseKind::UpdateMessage);
                assert_eq!(second, "6");
                assert_eq!(private.kind, ResponseKind::ChannelMessage);
                assert!(private.is_ephemeral());
                let content = private.data.as_ref().and_then(|d| d.message.content.as_deref());
                assert_eq!(content, Some("That button isn't yours"));
            }
            other => panic!("unexpected calls {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_denied_modal_submission_keeps_handle() {
        let allow = Arc::new(AtomicBool::new(false));
        let seen: Seen = Arc::default();
        let mut framework = Framework::new();
        let gate = allow.clone();
        framework.add_middleware(move |_ctx, _target| {
            let gate = gate.clone();
            async move { gate.load(Ordering::SeqCst) }
        });
        framework.gate_components(true);
        let router = framework.build();
        let record = seen.clone();
        router.components().register_modal(
            "77",
            inline_values(move |_ctx, values| {
                let record = record.clone();
                async move {
                    record.lock().unwrap().push(values.join("+"));
                    Ok(())
                }
            }),
        );
        let (_, shared) = transport();

        assert_eq!(
            router.dispatch(shared.clone(), submit("1", "~77", &["a"])).await,
            Outcome::Denied
        );
        assert_eq!(router.components().pending_modals(), 1);

        allow.store(true, Ordering::SeqCst);
        assert_eq!(
            router.dispatch(shared.clone(), submit("2", "~77", &["b"])).await,
            Outcome::Handled
        );
        assert_eq!(
            router.dispatch(shared, submit("3", "~77", &["c"])).await,
            Outcome::Dropped
        );
        assert_eq!(*seen.lock().unwrap(), vec!["b".to_string()]);
        assert_eq!(router.components().pending_modals(), 0);
    }

    #[tokio::test]
    async fn test_select_receives_values() {
        let seen: Seen = Arc::default();
        let record = seen.clone();
        let mut framework = Framework::new();
        framework
            .add_select_handler("pick", move |_ctx, params, values| {
                let record = record.clone();
                async move {
                    record.lock().unwrap().push(format!("{params}:{}", values.join(",")));
                    Ok(())
                }
            })
            .unwrap();
        let router = framework.build();
        let (_, shared) = transport();

        let mut ev = click("6", "pick|p", "m0");
        if let EventKind::MessageComponent(data) = &mut ev.kind {
            data.values = vec!["a".into(), "b".into()];
        }
        assert_eq!(router.dispatch(shared, ev).await, Outcome::Handled);
        assert_eq!(*seen.lock().unwrap(), vec!["p:a,b".to_string()]);
    }

    #[tokio::test]
    async fn test_middleware_stops_at_first_denial() {
        let seen: Seen = Arc::default();
        let mut framework = Framework::new();
        for (name, allow) in [("A", true), ("B", false), ("C", true)] {
            let record = seen.clone();
            framework.add_middleware(move |_ctx, _target| {
                let record = record.clone();
                async move {
                    record.lock().unwrap().push(name.to_string());
                    allow
                }
            });
        }
        let handled = seen.clone();
        framework
            .register_command(SlashCommand::new("ping", "pong", move |_ctx, _args| {
                let handled = handled.clone();
                async move {
                    handled.lock().unwrap().push("handler".into());
                    Ok(())
                }
            }))
            .unwrap();
        let router = framework.build();
        let (recording, shared) = transport();

        let outcome = router.dispatch(shared, command("1", "ping", Vec::new())).await;
        assert_eq!(outcome, Outcome::Denied);
        assert_eq!(*seen.lock().unwrap(), vec!["A".to_string(), "B".to_string()]);
        assert!(recording.calls().is_empty());
    }

    fn gated_framework(gate: bool, seen: Seen) -> Framework {
        let mut framework = Framework::new();
        framework.add_middleware(move |_ctx, target| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(target);
                false
            }
        });
        framework.gate_components(gate);
        framework
            .add_button_handler("click", |_ctx, _params| async { Ok(()) })
            .unwrap();
        framework
            .add_modal_handler("form", |_ctx, _params, _values| async { Ok(()) })
            .unwrap();
        framework
    }

    #[tokio::test]
    async fn test_components_bypass_middleware_by_default() {
        let seen: Seen = Arc::default();
        let router = gated_framework(false, seen.clone()).build();
        let (_, shared) = transport();

        assert_eq!(
            router.dispatch(shared.clone(), click("1", "click|x", "m")).await,
            Outcome::Handled
        );
        assert_eq!(
            router.dispatch(shared, submit("2", "form|", &["v"])).await,
            Outcome::Handled
        );
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_component_gating_passes_handler_id() {
        let seen: Seen = Arc::default();
        let router = gated_framework(true, seen.clone()).build();
        let (_, shared) = transport();

        assert_eq!(
            router.dispatch(shared.clone(), click("1", "click|x", "m")).await,
            Outcome::Denied
        );
        assert_eq!(
            router.dispatch(shared, submit("2", "form|", &["v"])).await,
            Outcome::Denied
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["click".to_string(), "form".to_string()]
        );
    }

    #[tokio::test]
    async fn test_autocomplete_never_gated_and_truncated() {
        let seen: Seen = Arc::default();
        let (logger, sink) = capturing_logger();
        let mut framework = Framework::new();
        framework.set_logger(logger);
        let guard_seen = seen.clone();
        framework.add_middleware(move |_ctx, target| {
            let guard_seen = guard_seen.clone();
            async move {
                guard_seen.lock().unwrap().push(target);
                false
            }
        });
        framework
            .register_command(
                SlashCommand::new("ping", "pong", |_ctx, _args| async { Ok(()) }).option(
                    CommandOption::new("text", "echo", OptionKind::String, true).autocomplete(
                        |ctx, value| async move {
                            assert_eq!(ctx.option, "text");
                            (0..30)
                                .map(|i| Choice::new(format!("{value}{i}"), format!("{value}{i}")))
                                .collect::<Vec<_>>()
                        },
                    ),
                ),
            )
            .unwrap();
        let router = framework.build();
        let (recording, shared) = transport();

        let ev = event(
            "9",
            EventKind::ApplicationCommandAutocomplete(CommandData {
                name: "ping".into(),
                options: vec![RawOption::value("text", 3, json!("he")).focused()],
                ..CommandData::default()
            }),
        );
        assert_eq!(router.dispatch(shared, ev).await, Outcome::Handled);
        assert!(seen.lock().unwrap().is_empty());
        assert!(sink.contains(Level::Warn, "truncated"));

        match &recording.calls()[0] {
            Call::Initial { response, .. } => {
                assert_eq!(response.kind, ResponseKind::AutocompleteResult);
                let choices = response.data.as_ref().unwrap().choices.as_ref().unwrap();
                assert_eq!(choices.len(), 25);
                assert_eq!(choices[0].name, "he0");
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inline_button_dispatch_and_stale_message() {
        let seen: Seen = Arc::default();
        let record = seen.clone();
        let mut framework = Framework::new();
        framework
            .register_command(SlashCommand::new("menu", "buttons", move |ctx, _args| {
                let record = record.clone();
                async move {
                    ctx.acknowledge().await?;
                    ctx.respond(MessagePayload::text("pick").row([Button::new(
                        "go",
                        ButtonStyle::Primary,
                    )
                    .on_click(move |ctx| {
                        let record = record.clone();
                        async move {
                            let origin = ctx.origin_followup().map(|f| f.message_id.clone());
                            record.lock().unwrap().push(origin.unwrap_or_default());
                            Ok(())
                        }
                    })]))
                    .await?;
                    Ok(())
                }
            }))
            .unwrap();
        let router = framework.build();
        let (_, shared) = transport();

        assert_eq!(
            router.dispatch(shared.clone(), command("1", "menu", Vec::new())).await,
            Outcome::Handled
        );
        // the follow-up carrying the button was created as m1
        assert_eq!(
            router.dispatch(shared.clone(), click("2", "~1.0|0", "m1")).await,
            Outcome::Handled
        );
        assert_eq!(*seen.lock().unwrap(), vec!["m1".to_string()]);

        assert_eq!(
            router.dispatch(shared.clone(), click("3", "~1.0|0", "m7")).await,
            Outcome::Dropped
        );

        router.components().forget_message("m1");
        assert_eq!(
            router.dispatch(shared, click("4", "~1.0|0", "m1")).await,
            Outcome::Dropped
        );
    }

    #[tokio::test]
    async fn test_inline_modal_is_single_use() {
        let seen: Seen = Arc::default();
        let record = seen.clone();
        let mut framework = Framework::new();
        framework
            .register_command(SlashCommand::new("form", "ask", move |ctx, _args| {
                let record = record.clone();
                async move {
                    ctx.modal(
                        Modal::new("Form", move |ctx, values| {
                            let record = record.clone();
                            async move {
                                record.lock().unwrap().push(values.join("+"));
                                ctx.respond("thanks").await?;
                                Ok(())
                            }
                        })
                        .input(ModalInput::new("A", TextInputStyle::Short))
                        .input(ModalInput::new("B", TextInputStyle::Paragraph)),
                    )
                    .await?;
                    Ok(())
                }
            }))
            .unwrap();
        let router = framework.build();
        let (recording, shared) = transport();

        router
            .dispatch(shared.clone(), command("10", "form", Vec::new()))
            .await;
        assert_eq!(
            router.dispatch(shared.clone(), submit("11", "~10", &["x", "y"])).await,
            Outcome::Handled
        );
        assert_eq!(
            router.dispatch(shared, submit("12", "~10", &["x", "y"])).await,
            Outcome::Dropped
        );
        assert_eq!(*seen.lock().unwrap(), vec!["x+y".to_string()]);
        assert_eq!(
            recording.initial_kinds(),
            vec![ResponseKind::Modal, ResponseKind::ChannelMessage]
        );
    }

    #[tokio::test]
    async fn test_handler_error_logged_not_retried() {
        let (logger, sink) = capturing_logger();
        let mut framework = Framework::new();
        framework.set_logger(logger);
        framework
            .register_command(SlashCommand::new("fail", "fails", |_ctx, _args| async {
                Err(anyhow::anyhow!("boom"))
            }))
            .unwrap();
        let router = framework.build();
        let (recording, shared) = transport();

        assert_eq!(
            router.dispatch(shared, command("77", "fail", Vec::new())).await,
            Outcome::Failed
        );
        assert!(sink.contains(Level::Error, "[77]"));
        assert!(sink.contains(Level::Error, "boom"));
        assert!(recording.calls().is_empty());
    }

    #[tokio::test]
    async fn test_message_handler_ignores_bots() {
        let seen: Seen = Arc::default();
        let record = seen.clone();
        let mut framework = Framework::new();
        framework.set_message_handler(move |ctx| {
            let record = record.clone();
            async move {
                record.lock().unwrap().push(ctx.content().to_string());
                if ctx.content() == "ping" {
                    ctx.respond("Pong!").await?;
                }
                Ok(())
            }
        });
        let router = framework.build();
        let (recording, shared) = transport();

        let mut message = MessageEvent {
            id: "1".into(),
            channel_id: "c".into(),
            guild_id: None,
            author: UserInfo::new("u", "user"),
            content: "ping".into(),
        };
        assert_eq!(
            router.dispatch_message(shared.clone(), message.clone()).await,
            Outcome::Handled
        );
        message.author.bot = true;
        assert_eq!(
            router.dispatch_message(shared, message).await,
            Outcome::Dropped
        );
        assert_eq!(*seen.lock().unwrap(), vec!["ping".to_string()]);
        assert_eq!(recording.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_register_commands_sends_every_root() {
        let mut framework = Framework::new();
        framework
            .register_command(SlashCommand::new("b", "second", |_ctx, _args| async { Ok(()) }))
            .unwrap();
        framework
            .register_command(SlashCommand::new("a", "first", |_ctx, _args| async { Ok(()) }))
            .unwrap();
        let router = framework.build();
        let recording = RecordingTransport::new();

        let count = router
            .register_commands(&recording, CommandScope::Guild(42))
            .await
            .unwrap();
        assert_eq!(count, 2);
        match &recording.calls()[0] {
            Call::Register { scope, commands } => {
                assert_eq!(*scope, CommandScope::Guild(42));
                assert_eq!(commands[0].name, "a");
            }
            other => panic!("unexpected call {other:?}"),
        }
    }
}
