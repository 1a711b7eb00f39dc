//! Autocomplete requests
//!
//! A request carries the partially typed command. Callbacks receive the
//! focused value plus everything else entered so far, and return at most
//! `MAX_SUGGESTIONS` choices.

use super::decode::ArgValue;
use super::options::Choice;
use crate::interaction::event::UserInfo;

/// Longest suggestion list the platform accepts
pub const MAX_SUGGESTIONS: usize = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteContext {
    pub interaction_id: String,
    pub user: UserInfo,
    pub guild_id: Option<String>,
    pub channel_id: String,
    /// Full command path, e.g. `test subtest subsubtest`
    pub command: String,
    /// Name of the option being typed
    pub option: String,
    /// Current values of every declared option, in declared order
    pub arguments: Vec<ArgValue>,
}

impl AutocompleteContext {
    /// Current value of another declared option
    pub fn argument(&self, index: usize) -> &ArgValue {
        self.arguments.get(index).unwrap_or(&ArgValue::Null)
    }
}

/// Cap a suggestion list, returning how many were dropped
pub fn truncate_suggestions(choices: &mut Vec<Choice>) -> usize {
    let dropped = choices.len().saturating_sub(MAX_SUGGESTIONS);
    choices.truncate(MAX_SUGGESTIONS);
    dropped
}
