//! `Transport` over serenity's raw HTTP client
//!
//! Payloads are serialized with serde and sent through the JSON-map endpoints,
//! so every wire call is exactly one HTTP request with no retry on top.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::http::Http;
use std::sync::Arc;

use crate::wire::{
    ApplicationCommand, CommandScope, InteractionResponse, MessageBody, Transport,
};

pub struct SerenityTransport {
    http: Arc<Http>,
}

impl SerenityTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn snowflake(raw: &str, what: &str) -> Result<u64> {
    raw.parse()
        .with_context(|| format!("invalid {what} id: {raw}"))
}

#[async_trait]
impl Transport for SerenityTransport {
    async fn register_commands(
        &self,
        scope: CommandScope,
        commands: &[ApplicationCommand],
    ) -> Result<()> {
        let map = serde_json::to_value(commands)?;
        match scope {
            CommandScope::Global => {
                self.http.create_global_application_commands(&map).await?;
            }
            CommandScope::Guild(guild_id) => {
                self.http
                    .create_guild_application_commands(guild_id, &map)
                    .await?;
            }
        }
        Ok(())
    }

    async fn create_interaction_response(
        &self,
        interaction_id: &str,
        token: &str,
        response: &InteractionResponse,
    ) -> Result<()> {
        let map = serde_json::to_value(response)?;
        self.http
            .create_interaction_response(snowflake(interaction_id, "interaction")?, token, &map)
            .await?;
        Ok(())
    }

    async fn create_followup(&self, token: &str, body: &MessageBody) -> Result<String> {
        let map = serde_json::to_value(body)?;
        let message = self.http.create_followup_message(token, &map).await?;
        Ok(message.id.to_string())
    }

    async fn edit_followup(
        &self,
        token: &str,
        message_id: &str,
        body: &MessageBody,
    ) -> Result<()> {
        let map = serde_json::to_value(body)?;
        self.http
            .edit_followup_message(token, snowflake(message_id, "message")?, &map)
            .await?;
        Ok(())
    }

    async fn edit_original(&self, token: &str, body: &MessageBody) -> Result<()> {
        let map = serde_json::to_value(body)?;
        self.http
            .edit_original_interaction_response(token, &map)
            .await?;
        Ok(())
    }

    async fn send_message(&self, channel_id: &str, body: &MessageBody) -> Result<String> {
        let map = serde_json::to_value(body)?;
        let message = self
            .http
            .send_message(snowflake(channel_id, "channel")?, &map)
            .await?;
        Ok(message.id.to_string())
    }

    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        body: &MessageBody,
    ) -> Result<()> {
        let map = serde_json::to_value(body)?;
        self.http
            .edit_message(
                snowflake(channel_id, "channel")?,
                snowflake(message_id, "message")?,
                &map,
            )
            .await?;
        Ok(())
    }

    async fn broadcast_typing(&self, channel_id: &str) -> Result<()> {
        self.http
            .broadcast_typing(snowflake(channel_id, "channel")?)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_parsing() {
        assert_eq!(snowflake("123", "channel").unwrap(), 123);
        let err = snowflake("abc", "channel").unwrap_err();
        assert!(err.to_string().contains("invalid channel id"));
    }
}
