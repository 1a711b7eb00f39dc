//! Component and modal callbacks
//!
//! Flat-table callbacks receive the params half of the custom id. Inline
//! callbacks are wrapped into the same shapes with empty params.

use anyhow::Result;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::commands::HandlerFuture;
use crate::interaction::InteractionContext;

pub type ButtonFn = Arc<dyn Fn(InteractionContext, String) -> HandlerFuture + Send + Sync>;

/// Select callback: params plus the selected values
pub type SelectFn =
    Arc<dyn Fn(InteractionContext, String, Vec<String>) -> HandlerFuture + Send + Sync>;

/// Modal callback: params plus the submitted field values in input order
pub type ModalFn = Arc<dyn Fn(InteractionContext, String, Vec<String>) -> HandlerFuture + Send + Sync>;

/// Callback addressed by a component custom id
#[derive(Clone)]
pub enum ComponentHandler {
    Button(ButtonFn),
    Select(SelectFn),
}

impl ComponentHandler {
    /// Invoke with whatever the component interaction delivered
    pub fn call(&self, ctx: InteractionContext, params: String, values: Vec<String>) -> HandlerFuture {
        match self {
            ComponentHandler::Button(f) => f(ctx, params),
            ComponentHandler::Select(f) => f(ctx, params, values),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComponentHandler::Button(_) => "button",
            ComponentHandler::Select(_) => "select",
        }
    }
}

impl fmt::Debug for ComponentHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentHandler::{}", self.label())
    }
}

pub fn button_handler<F, Fut>(f: F) -> ButtonFn
where
    F: Fn(InteractionContext, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, params| Box::pin(f(ctx, params)) as HandlerFuture)
}

pub fn select_handler<F, Fut>(f: F) -> SelectFn
where
    F: Fn(InteractionContext, String, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, params, values| Box::pin(f(ctx, params, values)) as HandlerFuture)
}

pub fn inline_button<F, Fut>(f: F) -> ButtonFn
where
    F: Fn(InteractionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, _params| Box::pin(f(ctx)) as HandlerFuture)
}

pub fn inline_values<F, Fut>(f: F) -> SelectFn
where
    F: Fn(InteractionContext, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, _params, values| Box::pin(f(ctx, values)) as HandlerFuture)
}
