//! Environment configuration
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Registry TTL and sweep interval
//! - 1.0.0: Token, guild and log level

use anyhow::{anyhow, Context, Result};
use std::time::Duration;

use crate::wire::CommandScope;

/// Default lifetime of message-scoped component handles and modal handles.
/// Matches the platform's 15 minute interaction token lifetime.
pub const DEFAULT_COMPONENT_TTL_SECS: u64 = 900;
/// Default interval between registry eviction sweeps
pub const DEFAULT_SWEEP_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub discord_token: String,
    /// Register commands to this guild only (instant updates while developing)
    pub discord_guild_id: Option<u64>,
    pub log_level: String,
    pub component_ttl: Duration,
    pub sweep_interval: Duration,
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("DISCORD_TOKEN must be set"))?;

        let discord_guild_id = match lookup("DISCORD_GUILD_ID").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("DISCORD_GUILD_ID is not a valid id: {raw}"))?,
            ),
            None => None,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let component_ttl = Duration::from_secs(parse_secs(
            &lookup,
            "COMPONENT_TTL_SECS",
            DEFAULT_COMPONENT_TTL_SECS,
        )?);
        let sweep_interval =
            Duration::from_secs(parse_secs(&lookup, "REGISTRY_SWEEP_SECS", DEFAULT_SWEEP_SECS)?);

        if sweep_interval.is_zero() {
            return Err(anyhow!("REGISTRY_SWEEP_SECS must be greater than zero"));
        }

        Ok(Self {
            discord_token,
            discord_guild_id,
            log_level,
            component_ttl,
            sweep_interval,
        })
    }

    /// Guild-only registration when a development guild is configured
    pub fn command_scope(&self) -> CommandScope {
        match self.discord_guild_id {
            Some(guild_id) => CommandScope::Guild(guild_id),
            None => CommandScope::Global,
        }
    }
}

fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.discord_guild_id, None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.component_ttl, Duration::from_secs(DEFAULT_COMPONENT_TTL_SECS));
        assert_eq!(config.sweep_interval, Duration::from_secs(DEFAULT_SWEEP_SECS));
        assert_eq!(config.command_scope(), CommandScope::Global);
    }

    #[test]
    fn test_missing_token_is_error() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DISCORD_TOKEN", "  ")])).is_err());
    }

    #[test]
    fn test_guild_id_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_GUILD_ID", "123456789012345678"),
        ]))
        .unwrap();
        assert_eq!(config.discord_guild_id, Some(123456789012345678));
        assert_eq!(config.command_scope(), CommandScope::Guild(123456789012345678));
    }

    #[test]
    fn test_invalid_guild_id_is_error() {
        let result = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_GUILD_ID", "not-a-number"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_ttl_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("COMPONENT_TTL_SECS", "30"),
            ("REGISTRY_SWEEP_SECS", "5"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.component_ttl, Duration::from_secs(30));
        assert_eq!(config.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("REGISTRY_SWEEP_SECS", "0"),
        ]));
        assert!(result.is_err());
    }
}
