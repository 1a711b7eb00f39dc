//! Outgoing message content

use serde_json::Value;
use serenity::builder::CreateEmbed;

use crate::components::builders::{render_rows, Component};
use crate::components::ComponentHandler;
use crate::core::RegistrationError;
use crate::wire::MessageBody;

/// Text, embeds and component rows of a reply
#[derive(Debug, Clone, Default)]
pub struct MessagePayload {
    pub content: Option<String>,
    pub embeds: Vec<Value>,
    pub rows: Vec<Vec<Component>>,
    /// Remove existing components when editing a message
    pub clear_components: bool,
}

pub(crate) struct RenderedMessage {
    pub body: MessageBody,
    pub inline: Vec<(String, ComponentHandler)>,
}

impl MessagePayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn embed(mut self, embed: CreateEmbed) -> Self {
        let map = embed.0.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        self.embeds.push(Value::Object(map));
        self
    }

    pub fn embed_json(mut self, embed: Value) -> Self {
        self.embeds.push(embed);
        self
    }

    /// Append one action row
    pub fn row<C: Into<Component>>(mut self, components: impl IntoIterator<Item = C>) -> Self {
        self.rows
            .push(components.into_iter().map(Into::into).collect());
        self
    }

    pub fn clear_components(mut self) -> Self {
        self.clear_components = true;
        self.rows.clear();
        self
    }

    /// Build the wire body, naming inline handles under `scope`
    pub(crate) fn render(&self, scope: &str) -> Result<RenderedMessage, RegistrationError> {
        let rendered = render_rows(&self.rows, scope)?;
        let components = if self.clear_components || !rendered.rows.is_empty() {
            Some(rendered.rows)
        } else {
            None
        };
        Ok(RenderedMessage {
            body: MessageBody {
                content: self.content.clone(),
                embeds: self.embeds.clone(),
                components,
                ..MessageBody::default()
            },
            inline: rendered.inline,
        })
    }
}

impl From<&str> for MessagePayload {
    fn from(content: &str) -> Self {
        Self::text(content)
    }
}

impl From<String> for MessagePayload {
    fn from(content: String) -> Self {
        Self::text(content)
    }
}
