//! Component custom ids
//!
//! Flat-table ids are `<handler>|<params>`: the handler name selects a
//! callback registered at startup and everything after the first separator is
//! passed to it verbatim. Ids starting with `~` address handles registered
//! inline by a reply and are never valid handler names.

use std::fmt;

use crate::core::RegistrationError;

pub const SEPARATOR: char = '|';
pub const SCOPED_PREFIX: char = '~';
/// Longest custom id the platform accepts
pub const MAX_CUSTOM_ID_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomId {
    pub handler: String,
    pub params: String,
}

impl CustomId {
    pub fn new(handler: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            params: params.into(),
        }
    }

    /// Split on the first separator; an id without one has empty params
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(SEPARATOR) {
            Some((handler, params)) => Self::new(handler, params),
            None => Self::new(raw, ""),
        }
    }

    /// Id of the `index`-th inline component sent under `scope`
    pub fn scoped(scope: &str, index: usize) -> Self {
        Self::new(format!("{SCOPED_PREFIX}{scope}"), index.to_string())
    }

    /// Scope key when this id addresses an inline handle
    pub fn scope(&self) -> Option<&str> {
        self.handler.strip_prefix(SCOPED_PREFIX)
    }

    pub fn encode(&self) -> String {
        format!("{}{SEPARATOR}{}", self.handler, self.params)
    }
}

impl fmt::Display for CustomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.handler, self.params)
    }
}

/// Handler names registered in the flat table
pub fn validate_handler_id(id: &str) -> Result<(), RegistrationError> {
    if id.is_empty()
        || id.contains(SEPARATOR)
        || id.starts_with(SCOPED_PREFIX)
        || id.len() >= MAX_CUSTOM_ID_LEN
    {
        return Err(RegistrationError::InvalidHandlerId(id.to_string()));
    }
    Ok(())
}

pub(crate) fn check_length(encoded: &str) -> Result<(), RegistrationError> {
    if encoded.chars().count() > MAX_CUSTOM_ID_LEN {
        return Err(RegistrationError::CustomIdTooLong(encoded.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_first_separator() {
        assert_eq!(CustomId::parse("click|42"), CustomId::new("click", "42"));
        assert_eq!(CustomId::parse("page|a|b"), CustomId::new("page", "a|b"));
        assert_eq!(CustomId::parse("click|"), CustomId::new("click", ""));
    }

    #[test]
    fn test_parse_without_separator_has_empty_params() {
        let id = CustomId::parse("click");
        assert_eq!(id.handler, "click");
        assert_eq!(id.params, "");
        assert_eq!(id.scope(), None);
    }

    #[test]
    fn test_encode_parse_identity() {
        let id = CustomId::new("vote", "u123");
        assert_eq!(id.encode(), "vote|u123");
        assert_eq!(id.to_string(), id.encode());
        assert_eq!(CustomId::parse(&id.encode()), id);
    }

    #[test]
    fn test_scoped_ids() {
        let id = CustomId::scoped("99.0", 2);
        assert_eq!(id.encode(), "~99.0|2");
        let parsed = CustomId::parse("~99.0|2");
        assert_eq!(parsed.scope(), Some("99.0"));
        assert_eq!(parsed.params, "2");
    }

    #[test]
    fn test_handler_id_rules() {
        assert!(validate_handler_id("click").is_ok());
        assert!(validate_handler_id("").is_err());
        assert!(validate_handler_id("a|b").is_err());
        assert!(validate_handler_id("~x").is_err());
        assert!(check_length(&"x".repeat(101)).is_err());
        assert!(check_length(&"x".repeat(100)).is_ok());
    }
}
