//! Guards run before handlers
//!
//! Each guard sees the reply context and the target name (command path or
//! component handler id) and returns whether dispatch may continue. Guards run
//! in registration order and the first denial stops the chain; a guard that
//! denies is expected to answer the user itself if it wants to.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::context::InteractionContext;

pub type GuardFuture = Pin<Box<dyn Future<Output = bool> + Send + 'static>>;
pub type GuardFn = Arc<dyn Fn(InteractionContext, String) -> GuardFuture + Send + Sync>;

#[derive(Clone, Default)]
pub struct MiddlewareChain {
    guards: Vec<GuardFn>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F, Fut>(&mut self, guard: F)
    where
        F: Fn(InteractionContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.guards
            .push(Arc::new(move |ctx, target| Box::pin(guard(ctx, target)) as GuardFuture));
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// True when every guard allows `target`
    pub async fn allows(&self, ctx: &InteractionContext, target: &str) -> bool {
        for guard in &self.guards {
            if !guard(ctx.clone(), target.to_string()).await {
                return false;
            }
        }
        true
    }
}
