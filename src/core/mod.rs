//! # Core Module
//!
//! Configuration, error types and the injected logging handle shared by every
//! layer.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Replace the global logger with an injected `Logger`
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{RegistrationError, ResponseError};
pub use logging::Logger;
