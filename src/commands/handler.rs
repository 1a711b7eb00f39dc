//! Type-erased command and autocomplete callbacks
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.0.0: Replace the handler trait with closures bound at declaration time
//! - 1.0.0: Initial implementation for modular command handling

use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::autocomplete::AutocompleteContext;
use super::decode::ArgValue;
use super::options::Choice;
use crate::interaction::InteractionContext;

/// Boxed future returned by every interaction callback
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

pub type ChoiceFuture = Pin<Box<dyn Future<Output = Vec<Choice>> + Send + 'static>>;

/// Leaf command callback: the reply context plus arguments in declared order
pub type CommandHandlerFn =
    Arc<dyn Fn(InteractionContext, Vec<ArgValue>) -> HandlerFuture + Send + Sync>;

/// Autocomplete callback: the partial context plus the focused value
pub type AutocompleteFn = Arc<dyn Fn(AutocompleteContext, ArgValue) -> ChoiceFuture + Send + Sync>;

pub fn command_handler<F, Fut>(f: F) -> CommandHandlerFn
where
    F: Fn(InteractionContext, Vec<ArgValue>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, args| Box::pin(f(ctx, args)) as HandlerFuture)
}

pub fn autocomplete_handler<F, Fut>(f: F) -> AutocompleteFn
where
    F: Fn(AutocompleteContext, ArgValue) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Vec<Choice>> + Send + 'static,
{
    Arc::new(move |ctx, value| Box::pin(f(ctx, value)) as ChoiceFuture)
}
