//! Outbound transport seam
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

use super::payload::{ApplicationCommand, InteractionResponse, MessageBody, ResponseKind};

/// Where a bulk command overwrite applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    Global,
    Guild(u64),
}

/// Kind of outbound call, attached to errors and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireCall {
    RegisterCommands,
    InteractionResponse(ResponseKind),
    CreateFollowup,
    EditFollowup,
    EditOriginal,
    SendMessage,
    EditMessage,
    Typing,
}

impl fmt::Display for WireCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireCall::RegisterCommands => write!(f, "register commands"),
            WireCall::InteractionResponse(kind) => {
                write!(f, "interaction response ({})", kind.label())
            }
            WireCall::CreateFollowup => write!(f, "create follow-up"),
            WireCall::EditFollowup => write!(f, "edit follow-up"),
            WireCall::EditOriginal => write!(f, "edit original response"),
            WireCall::SendMessage => write!(f, "send channel message"),
            WireCall::EditMessage => write!(f, "edit channel message"),
            WireCall::Typing => write!(f, "typing indicator"),
        }
    }
}

/// The outbound calls the router needs from a chat-platform client
///
/// Implementations must not retry: a retried initial response or follow-up can
/// surface as a duplicate message to the user.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Replace every registered command in `scope` with `commands`
    async fn register_commands(
        &self,
        scope: CommandScope,
        commands: &[ApplicationCommand],
    ) -> Result<()>;

    /// Send the single initial response of an interaction
    async fn create_interaction_response(
        &self,
        interaction_id: &str,
        token: &str,
        response: &InteractionResponse,
    ) -> Result<()>;

    /// Create a follow-up message, returning its message id
    async fn create_followup(&self, token: &str, body: &MessageBody) -> Result<String>;

    async fn edit_followup(&self, token: &str, message_id: &str, body: &MessageBody)
        -> Result<()>;

    /// Edit the initial response (or, for component interactions, the message
    /// the component is attached to)
    async fn edit_original(&self, token: &str, body: &MessageBody) -> Result<()>;

    /// Send a plain channel message, returning its message id
    async fn send_message(&self, channel_id: &str, body: &MessageBody) -> Result<String>;

    async fn edit_message(&self, channel_id: &str, message_id: &str, body: &MessageBody)
        -> Result<()>;

    async fn broadcast_typing(&self, channel_id: &str) -> Result<()>;
}
