//! # Message Components
//!
//! Buttons, select menus and modals, plus the handler tables their
//! interactions are dispatched through.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Inline handles scoped to the message they are sent on, TTL eviction
//! - 1.0.0: Flat `handler|params` routing

pub mod builders;
pub mod custom_id;
pub mod handler;
pub mod registry;

pub use builders::{
    Button, ButtonStyle, Component, ComponentEmoji, Modal, ModalInput, Select, SelectKind,
    SelectOption, TextInputStyle,
};
pub use custom_id::CustomId;
pub use handler::{ButtonFn, ComponentHandler, ModalFn, SelectFn};
pub use registry::{ComponentRegistry, FollowupRef, HandlerTable, ScopedMatch};
