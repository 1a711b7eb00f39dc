//! # Wire Layer
//!
//! Outbound payloads in the platform's JSON shape and the `Transport` trait the
//! core calls to deliver them. Everything here is plain data plus one trait seam;
//! the serenity implementation lives in `gateway`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

pub mod payload;
pub mod transport;

pub use payload::{
    ApplicationCommand, CommandOptionPayload, InteractionResponse, MessageBody, MessageReference,
    ResponseData, ResponseKind, WireChoice, WireComponent, WireEmoji, WireSelectOption,
    EPHEMERAL_FLAG,
};
pub use transport::{CommandScope, Transport, WireCall};

#[cfg(test)]
pub use transport::testing;
