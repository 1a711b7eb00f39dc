//! # Command System
//!
//! Declarative slash command trees, option decoding and autocomplete.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Commands are declared as trees with bound handlers and resolved by path
//! - 2.0.0: Autocomplete callbacks on options
//! - 1.0.0: Flat slash commands with typed options

pub mod autocomplete;
pub mod decode;
pub mod handler;
pub mod options;
pub mod registry;
pub mod tree;

pub use autocomplete::{AutocompleteContext, MAX_SUGGESTIONS};
pub use decode::{decode_arguments, decode_value, ArgValue};
pub use handler::{AutocompleteFn, CommandHandlerFn, HandlerFuture};
pub use options::{Choice, ChoiceValue, CommandOption, OptionKind};
pub use registry::{CommandRegistry, ResolvedCommand};
pub use tree::{CommandGroup, CommandNode, SlashCommand};
