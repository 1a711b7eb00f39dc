//! # Interaction Handling
//!
//! Inbound event model, reply contexts, middleware and the router that ties
//! commands and components together.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//! - **Toggleable**: false

pub mod context;
pub mod event;
pub mod message;
pub mod middleware;
pub mod payload;
pub mod router;

pub use context::{InteractionContext, Origin, ReplyPhase};
pub use event::{InboundEvent, MessageEvent, UserInfo};
pub use message::{MessageContext, MessageHandlerFn};
pub use middleware::MiddlewareChain;
pub use payload::MessagePayload;
pub use router::{Outcome, Router};
