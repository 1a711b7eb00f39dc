//! Outbound JSON payloads
//!
//! Field names and numeric codes follow the platform's HTTP API. Optional fields
//! are omitted rather than sent as `null`.

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Message flag marking a response as visible only to the invoking user
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

/// Kind of initial interaction response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    ChannelMessage,
    DeferredChannelMessage,
    UpdateMessage,
    AutocompleteResult,
    Modal,
}

impl ResponseKind {
    pub fn code(self) -> u8 {
        match self {
            ResponseKind::ChannelMessage => 4,
            ResponseKind::DeferredChannelMessage => 5,
            ResponseKind::UpdateMessage => 7,
            ResponseKind::AutocompleteResult => 8,
            ResponseKind::Modal => 9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResponseKind::ChannelMessage => "channel message",
            ResponseKind::DeferredChannelMessage => "deferred channel message",
            ResponseKind::UpdateMessage => "update message",
            ResponseKind::AutocompleteResult => "autocomplete result",
            ResponseKind::Modal => "modal",
        }
    }
}

impl Serialize for ResponseKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    pub fn deferred() -> Self {
        Self {
            kind: ResponseKind::DeferredChannelMessage,
            data: None,
        }
    }

    pub fn message(kind: ResponseKind, message: MessageBody) -> Self {
        Self {
            kind,
            data: Some(ResponseData {
                message,
                ..ResponseData::default()
            }),
        }
    }

    pub fn autocomplete(choices: Vec<WireChoice>) -> Self {
        Self {
            kind: ResponseKind::AutocompleteResult,
            data: Some(ResponseData {
                choices: Some(choices),
                ..ResponseData::default()
            }),
        }
    }

    pub fn modal(custom_id: String, title: String, rows: Vec<WireComponent>) -> Self {
        Self {
            kind: ResponseKind::Modal,
            data: Some(ResponseData {
                message: MessageBody {
                    components: Some(rows),
                    ..MessageBody::default()
                },
                custom_id: Some(custom_id),
                title: Some(title),
                ..ResponseData::default()
            }),
        }
    }

    /// Whether the response carries the ephemeral flag
    pub fn is_ephemeral(&self) -> bool {
        self.data
            .as_ref()
            .and_then(|d| d.message.flags)
            .is_some_and(|f| f & EPHEMERAL_FLAG != 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseData {
    #[serde(flatten)]
    pub message: MessageBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<WireChoice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Message body shared by interaction responses, follow-ups and channel messages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Value>,
    /// `Some(vec![])` clears the components of an edited message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<WireComponent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,
}

impl MessageBody {
    pub fn ephemeral(mut self) -> Self {
        self.flags = Some(self.flags.unwrap_or(0) | EPHEMERAL_FLAG);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageReference {
    pub message_id: String,
    pub channel_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireChoice {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireEmoji {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireSelectOption {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<WireEmoji>,
    #[serde(skip_serializing_if = "is_false")]
    pub default: bool,
}

/// Any message component: action rows (1), buttons (2), selects (3, 5-8) and
/// text inputs (4)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WireComponent {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<WireComponent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<WireEmoji>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<WireSelectOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_types: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_values: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_values: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Pre-filled text of a text input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl WireComponent {
    pub fn action_row(components: Vec<WireComponent>) -> Self {
        Self {
            kind: 1,
            components: Some(components),
            ..Self::default()
        }
    }
}

/// Top-level slash command in the bulk-overwrite payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationCommand {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOptionPayload {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<WireChoice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionPayload>,
    #[serde(skip_serializing_if = "is_false")]
    pub autocomplete: bool,
}
