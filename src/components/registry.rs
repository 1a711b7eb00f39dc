//! Component handler lookup
//!
//! Two tables live here. The flat table maps handler names to callbacks and is
//! frozen once the router is built. Scoped handles are registered by replies
//! while the router runs: component handles are grouped per sent message and
//! modal handles are keyed by the interaction that showed the modal.

use dashmap::DashMap;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use super::custom_id::validate_handler_id;
use super::handler::{button_handler, select_handler, ComponentHandler, ModalFn};
use crate::core::RegistrationError;
use crate::interaction::InteractionContext;

/// Handlers addressed by name, assembled before the router starts
#[derive(Clone, Default)]
pub struct HandlerTable {
    components: HashMap<String, ComponentHandler>,
    modals: HashMap<String, ModalFn>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_button<F, Fut>(&mut self, id: &str, f: F) -> Result<(), RegistrationError>
    where
        F: Fn(InteractionContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        validate_handler_id(id)?;
        self.components
            .insert(id.to_string(), ComponentHandler::Button(button_handler(f)));
        Ok(())
    }

    pub fn add_select<F, Fut>(&mut self, id: &str, f: F) -> Result<(), RegistrationError>
    where
        F: Fn(InteractionContext, String, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        validate_handler_id(id)?;
        self.components
            .insert(id.to_string(), ComponentHandler::Select(select_handler(f)));
        Ok(())
    }

    pub fn add_modal<F, Fut>(&mut self, id: &str, f: F) -> Result<(), RegistrationError>
    where
        F: Fn(InteractionContext, String, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        validate_handler_id(id)?;
        self.modals.insert(id.to_string(), select_handler(f));
        Ok(())
    }

    pub fn component(&self, id: &str) -> Option<&ComponentHandler> {
        self.components.get(id)
    }

    pub fn modal(&self, id: &str) -> Option<&ModalFn> {
        self.modals.get(id)
    }

    pub fn len(&self) -> usize {
        self.components.len() + self.modals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Message id and token of a follow-up, enough to edit it later
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowupRef {
    pub token: String,
    pub message_id: String,
}

struct ScopedComponents {
    handlers: HashMap<String, ComponentHandler>,
    /// Message carrying the components, once known
    message_id: Option<String>,
    followup: Option<FollowupRef>,
    registered_at: Instant,
}

struct ModalHandle {
    handler: ModalFn,
    registered_at: Instant,
}

/// A scoped handle matched by a component interaction
#[derive(Debug, Clone)]
pub struct ScopedMatch {
    pub handler: ComponentHandler,
    /// Set when the components were sent on a follow-up message
    pub followup: Option<FollowupRef>,
}

#[derive(Default)]
pub struct ComponentRegistry {
    table: HandlerTable,
    scoped: DashMap<String, ScopedComponents>,
    modals: DashMap<String, ModalHandle>,
}

impl ComponentRegistry {
    pub fn new(table: HandlerTable) -> Self {
        Self {
            table,
            scoped: DashMap::new(),
            modals: DashMap::new(),
        }
    }

    pub fn table(&self) -> &HandlerTable {
        &self.table
    }

    /// Register the inline handles of one outgoing message
    pub fn register_scope(&self, scope: &str, handlers: Vec<(String, ComponentHandler)>) {
        if handlers.is_empty() {
            return;
        }
        self.scoped.insert(
            scope.to_string(),
            ScopedComponents {
                handlers: handlers.into_iter().collect(),
                message_id: None,
                followup: None,
                registered_at: Instant::now(),
            },
        );
    }

    /// Record which message a scope's components were sent on
    pub fn bind_message(&self, scope: &str, message_id: &str, followup: Option<FollowupRef>) {
        if let Some(mut entry) = self.scoped.get_mut(scope) {
            entry.message_id = Some(message_id.to_string());
            entry.followup = followup;
        }
    }

    pub fn remove_scope(&self, scope: &str) {
        self.scoped.remove(scope);
    }

    /// Look up an inline handle
    ///
    /// A scope whose message is still unknown is bound to the first message a
    /// matching click arrives from; clicks from any other message are treated
    /// as stale.
    pub fn lookup_scoped(&self, scope: &str, local: &str, message_id: &str) -> Option<ScopedMatch> {
        let mut entry = self.scoped.get_mut(scope)?;
        if entry
            .message_id
            .as_deref()
            .is_some_and(|bound| bound != message_id)
        {
            return None;
        }
        let handler = entry.handlers.get(local)?.clone();
        if entry.message_id.is_none() {
            entry.message_id = Some(message_id.to_string());
        }
        Some(ScopedMatch {
            handler,
            followup: entry.followup.clone(),
        })
    }

    pub fn register_modal(&self, interaction_id: &str, handler: ModalFn) {
        self.modals.insert(
            interaction_id.to_string(),
            ModalHandle {
                handler,
                registered_at: Instant::now(),
            },
        );
    }

    pub fn has_modal(&self, interaction_id: &str) -> bool {
        self.modals.contains_key(interaction_id)
    }

    /// Remove and return a modal handle; a second submission finds nothing
    pub fn take_modal(&self, interaction_id: &str) -> Option<ModalFn> {
        self.modals
            .remove(interaction_id)
            .map(|(_, handle)| handle.handler)
    }

    /// Drop every scope bound to a deleted message
    pub fn forget_message(&self, message_id: &str) -> usize {
        let before = self.scoped.len();
        self.scoped
            .retain(|_, entry| entry.message_id.as_deref() != Some(message_id));
        before - self.scoped.len()
    }

    /// Drop scoped and modal handles registered at least `ttl` ago
    pub fn evict_expired(&self, ttl: Duration) -> usize {
        self.evict_registered_before(Instant::now(), ttl)
    }

    fn evict_registered_before(&self, now: Instant, ttl: Duration) -> usize {
        let expired = |at: Instant| now.saturating_duration_since(at) >= ttl;
        let before = self.scoped.len() + self.modals.len();
        self.scoped.retain(|_, entry| !expired(entry.registered_at));
        self.modals.retain(|_, handle| !expired(handle.registered_at));
        before - (self.scoped.len() + self.modals.len())
    }

    pub fn scoped_len(&self) -> usize {
        self.scoped.len()
    }

    pub fn pending_modals(&self) -> usize {
        self.modals.len()
    }
}
