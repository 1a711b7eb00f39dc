//! Declarative command trees
//!
//! A top-level command is either a leaf with options or a group whose children
//! are leaves or groups of leaves. The platform allows two levels of grouping
//! at most, so a group inside a nested group is rejected at registration.

use regex::Regex;
use serenity::model::permissions::Permissions;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::OnceLock;

use super::decode::ArgValue;
use super::handler::{command_handler, CommandHandlerFn};
use super::options::{CommandOption, MAX_ENTRIES, SUBCOMMAND, SUBCOMMAND_GROUP};
use crate::core::RegistrationError;
use crate::interaction::InteractionContext;
use crate::wire::{ApplicationCommand, CommandOptionPayload};

const MAX_DESCRIPTION: usize = 100;
/// Wire type of a chat-input (slash) command
const CHAT_INPUT: u8 = 1;

fn name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[-_\p{L}\p{N}]{1,32}$").ok())
        .as_ref()
}

pub(crate) fn check_name(name: &str) -> Result<(), RegistrationError> {
    if name_pattern().is_some_and(|re| re.is_match(name)) && name.to_lowercase() == name {
        Ok(())
    } else {
        Err(RegistrationError::InvalidName(name.to_string()))
    }
}

pub(crate) fn check_description(name: &str, description: &str) -> Result<(), RegistrationError> {
    let len = description.chars().count();
    if (1..=MAX_DESCRIPTION).contains(&len) {
        Ok(())
    } else {
        Err(RegistrationError::InvalidDescription(name.to_string()))
    }
}

fn check_count(name: &str, what: &'static str, count: usize) -> Result<(), RegistrationError> {
    if count > MAX_ENTRIES {
        return Err(RegistrationError::TooMany {
            name: name.to_string(),
            what,
            count,
            limit: MAX_ENTRIES,
        });
    }
    Ok(())
}

fn check_unique<'a>(
    parent: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), RegistrationError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(RegistrationError::DuplicateName {
                parent: parent.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub enum CommandNode {
    Group(CommandGroup),
    Leaf(SlashCommand),
}

impl CommandNode {
    pub fn name(&self) -> &str {
        match self {
            CommandNode::Group(g) => &g.name,
            CommandNode::Leaf(l) => &l.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            CommandNode::Group(g) => &g.description,
            CommandNode::Leaf(l) => &l.description,
        }
    }

    fn permissions(&self) -> Option<Permissions> {
        match self {
            CommandNode::Group(g) => g.permissions,
            CommandNode::Leaf(l) => l.permissions,
        }
    }

    /// Check the whole tree against the platform's structural limits
    pub fn validate(&self) -> Result<(), RegistrationError> {
        self.validate_at(0, self.name())
    }

    fn validate_at(&self, depth: usize, path: &str) -> Result<(), RegistrationError> {
        check_name(self.name())?;
        check_description(path, self.description())?;
        if depth > 0 && self.permissions().is_some() {
            return Err(RegistrationError::NestedPermissions(path.to_string()));
        }

        match self {
            CommandNode::Group(group) => {
                if depth >= 2 {
                    return Err(RegistrationError::TooDeep(path.to_string()));
                }
                if group.children.is_empty() {
                    return Err(RegistrationError::EmptyGroup(path.to_string()));
                }
                check_count(path, "children", group.children.len())?;
                check_unique(path, group.children.iter().map(CommandNode::name))?;
                for child in &group.children {
                    child.validate_at(depth + 1, &format!("{path} {}", child.name()))?;
                }
            }
            CommandNode::Leaf(leaf) => {
                check_count(path, "options", leaf.options.len())?;
                check_unique(path, leaf.options.iter().map(|o| o.name.as_str()))?;
                let mut seen_optional = false;
                for option in &leaf.options {
                    if option.required && seen_optional {
                        return Err(RegistrationError::RequiredAfterOptional {
                            command: path.to_string(),
                            option: option.name.clone(),
                        });
                    }
                    seen_optional |= !option.required;
                    option.validate()?;
                }
            }
        }
        Ok(())
    }

    /// Top-level command payload for the bulk overwrite call
    pub fn to_wire(&self) -> ApplicationCommand {
        let options = match self {
            CommandNode::Group(g) => g.children.iter().map(CommandNode::child_payload).collect(),
            CommandNode::Leaf(l) => l.options.iter().map(CommandOption::to_wire).collect(),
        };
        ApplicationCommand {
            name: self.name().to_string(),
            description: self.description().to_string(),
            kind: CHAT_INPUT,
            options,
            default_member_permissions: self.permissions().map(|p| p.bits().to_string()),
        }
    }

    fn child_payload(&self) -> CommandOptionPayload {
        let (kind, options) = match self {
            CommandNode::Group(g) => (
                SUBCOMMAND_GROUP,
                g.children.iter().map(CommandNode::child_payload).collect(),
            ),
            CommandNode::Leaf(l) => (
                SUBCOMMAND,
                l.options.iter().map(CommandOption::to_wire).collect(),
            ),
        };
        CommandOptionPayload {
            kind,
            name: self.name().to_string(),
            description: self.description().to_string(),
            required: false,
            choices: Vec::new(),
            options,
            autocomplete: false,
        }
    }
}

impl From<CommandGroup> for CommandNode {
    fn from(group: CommandGroup) -> Self {
        CommandNode::Group(group)
    }
}

impl From<SlashCommand> for CommandNode {
    fn from(leaf: SlashCommand) -> Self {
        CommandNode::Leaf(leaf)
    }
}

/// A named group of subcommands
///
/// Children may mix leaves and nested groups at the same level, which the
/// platform accepts, so siblings are not required to share a depth. A group
/// nested inside another nested group is still rejected.
#[derive(Clone, Debug)]
pub struct CommandGroup {
    pub name: String,
    pub description: String,
    pub children: Vec<CommandNode>,
    /// Default member permissions; honoured on top-level groups only
    pub permissions: Option<Permissions>,
}

impl CommandGroup {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            children: Vec::new(),
            permissions: None,
        }
    }

    pub fn child(mut self, child: impl Into<CommandNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn require_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }
}

/// Invocable leaf: options plus the bound handler
#[derive(Clone)]
pub struct SlashCommand {
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOption>,
    pub permissions: Option<Permissions>,
    pub(crate) handler: CommandHandlerFn,
}

impl SlashCommand {
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(InteractionContext, Vec<ArgValue>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
            permissions: None,
            handler: command_handler(handler),
        }
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn require_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn handler(&self) -> &CommandHandlerFn {
        &self.handler
    }
}

impl fmt::Debug for SlashCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlashCommand")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("permissions", &self.permissions)
            .finish()
    }
}
