//! Scripted reaction hooks - callbacks owned by the presentation layer.
//!
//! The director only ever holds weak references to handlers and treats every
//! invocation as fire-and-forget: a failing or panicking handler is logged
//! and otherwise ignored.

mod trigger;

pub use trigger::*;

use case_rules::{ActorId, ItemId, Point};
use serde::Serialize;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use thiserror::Error;

/// Error a handler may report back.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("Hook '{hook_id}' failed: {reason}")]
    Failed { hook_id: String, reason: String },
}

impl HookError {
    pub fn failed(hook_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            hook_id: hook_id.into(),
            reason: reason.into(),
        }
    }
}

/// What a handler is told about the event that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookContext {
    pub hook_id: String,
    pub scenario_id: String,
    pub item_id: ItemId,
    pub origin: Option<Point>,
    pub actor: Option<ActorId>,
    /// Trigger-specific payload.
    pub details: serde_json::Value,
}

/// A presentation-side reaction, e.g. a cutscene or a notification.
pub trait ReactionHook: Send + Sync {
    fn invoke(&self, context: &HookContext) -> Result<(), HookError>;
}

impl<F> ReactionHook for F
where
    F: Fn(&HookContext) -> Result<(), HookError> + Send + Sync,
{
    fn invoke(&self, context: &HookContext) -> Result<(), HookError> {
        self(context)
    }
}

/// Handlers by hook id, held weakly.
#[derive(Default)]
pub struct HookRegistry {
    handlers: HashMap<String, Weak<dyn ReactionHook>>,
}

impl HookRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. The caller keeps ownership; dropping the last
    /// `Arc` silently unregisters it.
    pub fn register(&mut self, hook_id: impl Into<String>, handler: &Arc<dyn ReactionHook>) {
        self.handlers.insert(hook_id.into(), Arc::downgrade(handler));
    }

    /// Remove a handler. Returns whether one was registered.
    pub fn unregister(&mut self, hook_id: &str) -> bool {
        self.handlers.remove(hook_id).is_some()
    }

    /// Check if a live handler is registered for a hook id.
    pub fn is_registered(&self, hook_id: &str) -> bool {
        self.handlers
            .get(hook_id)
            .is_some_and(|handler| handler.strong_count() > 0)
    }

    /// Invoke the handler for `context.hook_id`.
    ///
    /// Returns `true` only if a handler ran and reported success. Errors and
    /// panics are swallowed.
    pub fn invoke(&self, context: &HookContext) -> bool {
        let Some(handler) = self.handlers.get(&context.hook_id).and_then(Weak::upgrade) else {
            tracing::debug!(hook = %context.hook_id, "no live handler for hook");
            return false;
        };

        match catch_unwind(AssertUnwindSafe(|| handler.invoke(context))) {
            Ok(Ok(())) => {
                tracing::debug!(hook = %context.hook_id, "hook invoked");
                true
            }
            Ok(Err(err)) => {
                tracing::warn!(hook = %context.hook_id, error = %err, "hook failed");
                false
            }
            Err(_) => {
                tracing::warn!(hook = %context.hook_id, "hook panicked");
                false
            }
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.handlers.keys().collect();
        ids.sort();
        f.debug_struct("HookRegistry").field("handlers", &ids).finish()
    }
}
