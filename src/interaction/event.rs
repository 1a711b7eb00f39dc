//! Inbound events, decoupled from the gateway library's model types
//!
//! The gateway layer converts each platform payload into one of these before
//! handing it to the router, which keeps dispatch testable without a live
//! connection.

use serde_json::Value;
use std::collections::HashMap;

/// The user behind an interaction, a message, or a resolved user option
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub bot: bool,
    /// Guild membership data, absent in direct messages
    pub member: Option<MemberInfo>,
}

impl UserInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Nickname when one is set in the guild, else the account name
    pub fn display_name(&self) -> &str {
        self.member
            .as_ref()
            .and_then(|m| m.nickname.as_deref())
            .unwrap_or(&self.name)
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberInfo {
    pub nickname: Option<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentInfo {
    pub id: String,
    pub filename: String,
    pub url: String,
    pub proxy_url: String,
    pub content_type: Option<String>,
    pub size: u64,
}

/// Side-table of objects referenced by id from option values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedData {
    pub users: HashMap<String, UserInfo>,
    pub attachments: HashMap<String, AttachmentInfo>,
}

/// One option node as the platform sent it
///
/// `kind` is the raw option-type code; subcommands and groups carry their
/// children in `options` and no `value`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOption {
    pub name: String,
    pub kind: u8,
    pub value: Option<Value>,
    pub options: Vec<RawOption>,
    pub focused: bool,
}

impl RawOption {
    pub fn value(name: impl Into<String>, kind: u8, value: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn nested(name: impl Into<String>, kind: u8, options: Vec<RawOption>) -> Self {
        Self {
            name: name.into(),
            kind,
            options,
            ..Self::default()
        }
    }

    pub fn focused(mut self) -> Self {
        self.focused = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandData {
    pub name: String,
    pub options: Vec<RawOption>,
    pub resolved: ResolvedData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentData {
    pub custom_id: String,
    /// Selected values for select menus, empty for buttons
    pub values: Vec<String>,
    /// Message the component is attached to
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalField {
    pub custom_id: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalSubmitData {
    pub custom_id: String,
    pub fields: Vec<ModalField>,
}

impl ModalSubmitData {
    /// Field values in input order
    ///
    /// Inputs are rendered with their position as custom id, so fields are
    /// placed by that index when present and by arrival order otherwise.
    pub fn values(&self) -> Vec<String> {
        let mut indexed: Vec<(usize, &str)> = self
            .fields
            .iter()
            .enumerate()
            .map(|(pos, field)| {
                (
                    field.custom_id.parse::<usize>().unwrap_or(pos),
                    field.value.as_str(),
                )
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, v)| v.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    ApplicationCommand(CommandData),
    ApplicationCommandAutocomplete(CommandData),
    MessageComponent(ComponentData),
    ModalSubmit(ModalSubmitData),
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::ApplicationCommand(_) => "command",
            EventKind::ApplicationCommandAutocomplete(_) => "autocomplete",
            EventKind::MessageComponent(_) => "component",
            EventKind::ModalSubmit(_) => "modal submit",
        }
    }
}

/// An interaction delivered by the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub id: String,
    /// Continuation token for the response and follow-up endpoints
    pub token: String,
    pub user: UserInfo,
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub kind: EventKind,
}

/// A plain channel message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEvent {
    pub id: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub author: UserInfo,
    pub content: String,
}
