//! Error types signalled by the framework itself
//!
//! Handler and transport code returns `anyhow::Result`; the two enums here are
//! the failures callers are expected to match on.

use thiserror::Error;

use crate::wire::WireCall;

/// Rejected at registration or payload-build time, before anything reaches the
/// platform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("invalid name '{0}': must be 1-32 lowercase letters, digits, '-' or '_'")]
    InvalidName(String),
    #[error("'{0}' needs a description of 1-100 characters")]
    InvalidDescription(String),
    #[error("group '{0}' has no children")]
    EmptyGroup(String),
    #[error("'{0}' nests a third level of grouping")]
    TooDeep(String),
    #[error("'{name}' has {count} {what}, the limit is {limit}")]
    TooMany {
        name: String,
        what: &'static str,
        count: usize,
        limit: usize,
    },
    #[error("'{parent}' declares '{name}' more than once")]
    DuplicateName { parent: String, name: String },
    #[error("required option '{option}' of '{command}' follows an optional one")]
    RequiredAfterOptional { command: String, option: String },
    #[error("option '{0}' declares both choices and autocomplete")]
    ChoicesWithAutocomplete(String),
    #[error("option '{0}' cannot declare choices for its kind")]
    ChoicesNotSupported(String),
    #[error("choice '{choice}' of option '{option}' does not match the option kind")]
    ChoiceTypeMismatch { option: String, choice: String },
    #[error("'{0}' sets a permission mask below the top-level command")]
    NestedPermissions(String),
    #[error("invalid handler id '{0}'")]
    InvalidHandlerId(String),
    #[error("custom id '{0}' is used more than once in one message")]
    DuplicateComponentId(String),
    #[error("custom id '{0}' exceeds 100 characters")]
    CustomIdTooLong(String),
    #[error("invalid component layout: {0}")]
    Layout(String),
}

/// Rejected reply operation on an interaction or message context
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("interaction {0} already received its initial response; acknowledge() first to send follow-ups")]
    AlreadyResponded(String),
    #[error("interaction {0} was answered with a modal; no further responses are allowed")]
    ModalAlreadyShown(String),
    #[error("interaction {interaction} cannot show a modal: {reason}")]
    ModalNotAllowed {
        interaction: String,
        reason: &'static str,
    },
    #[error("message context {0} has not sent anything to edit")]
    NothingToEdit(String),
    #[error(transparent)]
    InvalidPayload(#[from] RegistrationError),
    #[error("{call} failed for {target}: {cause:#}")]
    Transport {
        call: WireCall,
        target: String,
        cause: anyhow::Error,
    },
}

impl ResponseError {
    /// True for misuse of the reply protocol, as opposed to payload or network
    /// failures
    pub fn is_protocol_misuse(&self) -> bool {
        matches!(
            self,
            ResponseError::AlreadyResponded(_)
                | ResponseError::ModalAlreadyShown(_)
                | ResponseError::ModalNotAllowed { .. }
                | ResponseError::NothingToEdit(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_transport_error_message_names_call() {
        let err = ResponseError::Transport {
            call: WireCall::CreateFollowup,
            target: "interaction 42".to_string(),
            cause: anyhow!("404 Unknown interaction"),
        };
        let text = err.to_string();
        assert!(text.contains("create follow-up"));
        assert!(text.contains("interaction 42"));
        assert!(text.contains("Unknown interaction"));
        assert!(!err.is_protocol_misuse());
    }

    #[test]
    fn test_protocol_misuse_classification() {
        assert!(ResponseError::AlreadyResponded("1".into()).is_protocol_misuse());
        assert!(ResponseError::ModalAlreadyShown("1".into()).is_protocol_misuse());
        assert!(!ResponseError::InvalidPayload(RegistrationError::EmptyGroup("x".into()))
            .is_protocol_misuse());
    }
}
