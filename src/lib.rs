// Core layer - configuration, errors and the injected logger
pub mod core;

// Wire layer - outbound payloads and the transport seam
pub mod wire;

// Command layer - declarative trees, decoding and autocomplete
pub mod commands;

// Component layer - buttons, selects, modals and their handler tables
pub mod components;

// Interaction layer - reply contexts, middleware and the router
pub mod interaction;

// Gateway layer - serenity client adapter
pub mod gateway;

// Application layer
pub mod framework;

pub use crate::core::{Config, Logger, RegistrationError, ResponseError};
pub use framework::Framework;

pub use commands::{
    ArgValue, AutocompleteContext, Choice, CommandGroup, CommandOption, OptionKind, SlashCommand,
};
pub use components::{
    Button, ButtonStyle, ComponentEmoji, Modal, ModalInput, Select, SelectKind, SelectOption,
    TextInputStyle,
};
pub use gateway::BotSession;
pub use interaction::{
    InteractionContext, MessageContext, MessagePayload, Outcome, ReplyPhase, Router,
};
