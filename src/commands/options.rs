//! Option declarations and fixed choices

use serde_json::{json, Value};
use std::fmt;
use std::future::Future;

use super::autocomplete::AutocompleteContext;
use super::decode::ArgValue;
use super::handler::{autocomplete_handler, AutocompleteFn};
use crate::core::RegistrationError;
use crate::wire::{CommandOptionPayload, WireChoice};

/// Most options, children or choices one node may declare
pub const MAX_ENTRIES: usize = 25;

/// Wire code of a subcommand node
pub const SUBCOMMAND: u8 = 1;
/// Wire code of a subcommand group node
pub const SUBCOMMAND_GROUP: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Float,
    Attachment,
}

impl OptionKind {
    pub fn code(self) -> u8 {
        match self {
            OptionKind::String => 3,
            OptionKind::Integer => 4,
            OptionKind::Boolean => 5,
            OptionKind::User => 6,
            OptionKind::Channel => 7,
            OptionKind::Role => 8,
            OptionKind::Float => 10,
            OptionKind::Attachment => 11,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            3 => OptionKind::String,
            4 => OptionKind::Integer,
            5 => OptionKind::Boolean,
            6 => OptionKind::User,
            7 => OptionKind::Channel,
            8 => OptionKind::Role,
            10 => OptionKind::Float,
            11 => OptionKind::Attachment,
            _ => return None,
        })
    }

    fn supports_choices(self) -> bool {
        matches!(
            self,
            OptionKind::String | OptionKind::Integer | OptionKind::Float
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceValue {
    String(String),
    Integer(i64),
    Float(f64),
}

impl ChoiceValue {
    fn fits(&self, kind: OptionKind) -> bool {
        matches!(
            (self, kind),
            (ChoiceValue::String(_), OptionKind::String)
                | (ChoiceValue::Integer(_), OptionKind::Integer)
                | (ChoiceValue::Float(_), OptionKind::Float)
                | (ChoiceValue::Integer(_), OptionKind::Float)
        )
    }

    fn to_json(&self) -> Value {
        match self {
            ChoiceValue::String(s) => json!(s),
            ChoiceValue::Integer(n) => json!(n),
            ChoiceValue::Float(f) => json!(f),
        }
    }
}

/// A display name paired with the value submitted when it is picked
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub name: String,
    pub value: ChoiceValue,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ChoiceValue::String(value.into()),
        }
    }

    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: ChoiceValue::Integer(value),
        }
    }

    pub fn float(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: ChoiceValue::Float(value),
        }
    }

    pub(crate) fn to_wire(&self) -> WireChoice {
        WireChoice {
            name: self.name.clone(),
            value: self.value.to_json(),
        }
    }
}

/// A typed argument declared on a leaf command
#[derive(Clone)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
    pub required: bool,
    pub choices: Vec<Choice>,
    pub(crate) autocomplete: Option<AutocompleteFn>,
}

impl CommandOption {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: OptionKind,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required,
            choices: Vec::new(),
            autocomplete: None,
        }
    }

    pub fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Attach a callback suggesting values while the user types
    pub fn autocomplete<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(AutocompleteContext, ArgValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Vec<Choice>> + Send + 'static,
    {
        self.autocomplete = Some(autocomplete_handler(f));
        self
    }

    pub fn has_autocomplete(&self) -> bool {
        self.autocomplete.is_some()
    }

    pub(crate) fn validate(&self) -> Result<(), RegistrationError> {
        super::tree::check_name(&self.name)?;
        super::tree::check_description(&self.name, &self.description)?;
        if self.choices.is_empty() {
            return Ok(());
        }
        if self.autocomplete.is_some() {
            return Err(RegistrationError::ChoicesWithAutocomplete(self.name.clone()));
        }
        if !self.kind.supports_choices() {
            return Err(RegistrationError::ChoicesNotSupported(self.name.clone()));
        }
        if self.choices.len() > MAX_ENTRIES {
            return Err(RegistrationError::TooMany {
                name: self.name.clone(),
                what: "choices",
                count: self.choices.len(),
                limit: MAX_ENTRIES,
            });
        }
        if let Some(bad) = self.choices.iter().find(|c| !c.value.fits(self.kind)) {
            return Err(RegistrationError::ChoiceTypeMismatch {
                option: self.name.clone(),
                choice: bad.name.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn to_wire(&self) -> CommandOptionPayload {
        CommandOptionPayload {
            kind: self.kind.code(),
            name: self.name.clone(),
            description: self.description.clone(),
            required: self.required,
            choices: self.choices.iter().map(Choice::to_wire).collect(),
            options: Vec::new(),
            autocomplete: self.autocomplete.is_some(),
        }
    }
}

impl fmt::Debug for CommandOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandOption")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("choices", &self.choices.len())
            .field("autocomplete", &self.autocomplete.is_some())
            .finish()
    }
}
