//! The callback registry.
//!
//! An ordered, append-only list of [`CallbackEntry`]s. Registration order is
//! match precedence: [`CallbackRegistry::find`] returns the first entry whose
//! constraints are satisfied, with no scoring and no best-match selection.
//!
//! The registry is built during setup and only read while serving traffic;
//! registration takes `&mut self` so it cannot overlap a dispatch.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::constraint::Constraints;
use crate::error::BoxError;
use crate::handler::{BoxedHandler, Reply};
use crate::matcher;
use crate::payload::InteractionPayload;
use crate::respond::Respond;

/// Which registration call created an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Registered with `action`.
    Action,
    /// Registered with `options`.
    Options,
}

/// An immutable `(constraints, handler)` pair.
#[derive(Clone)]
pub struct CallbackEntry {
    constraints: Constraints,
    handler: BoxedHandler,
    kind: EntryKind,
}

impl CallbackEntry {
    /// Creates a new entry.
    pub fn new(constraints: Constraints, handler: BoxedHandler, kind: EntryKind) -> Self {
        Self {
            constraints,
            handler,
            kind,
        }
    }

    /// The entry's constraints.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// The registration call that created this entry.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns `true` if this entry accepts `payload`.
    pub fn matches(&self, payload: &InteractionPayload) -> bool {
        matcher::matches(&self.constraints, payload)
    }

    /// Invokes the handler.
    pub fn call(
        &self,
        payload: Arc<InteractionPayload>,
        respond: Option<Respond>,
    ) -> Result<Reply, BoxError> {
        (self.handler)(payload, respond)
    }
}

impl fmt::Debug for CallbackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackEntry")
            .field("constraints", &self.constraints)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of callback entries.
#[derive(Default, Clone)]
pub struct CallbackRegistry {
    entries: Vec<CallbackEntry>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry. Duplicates are kept as independent entries.
    pub fn register(
        &mut self,
        constraints: Constraints,
        handler: BoxedHandler,
        kind: EntryKind,
    ) -> &mut Self {
        self.entries
            .push(CallbackEntry::new(constraints, handler, kind));
        self
    }

    /// Returns the first entry, in registration order, that accepts `payload`.
    pub fn find(&self, payload: &InteractionPayload) -> Option<&CallbackEntry> {
        let found = self
            .entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.matches(payload));

        if let Some((index, entry)) = found {
            trace!(
                callback_id = %payload.callback_id,
                entry_index = index,
                kind = ?entry.kind(),
                "Callback entry matched"
            );
        }

        found.map(|(_, entry)| entry)
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CallbackEntry> {
        self.entries.iter()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("entry_count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::action_handler;
    use serde_json::json;

    fn tagged(tag: &'static str) -> BoxedHandler {
        action_handler(move |_, _| json!(tag))
    }

    fn tag_of(entry: &CallbackEntry) -> serde_json::Value {
        match entry
            .call(Arc::new(InteractionPayload::default()), None)
            .unwrap()
        {
            Reply::Value(v) => v,
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_empty_registry_finds_nothing() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.find(&InteractionPayload::new("a")).is_none());
    }

    #[test]
    fn test_first_registered_wins() {
        let mut registry = CallbackRegistry::new();
        registry
            .register(Constraints::new().callback_id("a"), tagged("first"), EntryKind::Action)
            .register(Constraints::new(), tagged("second"), EntryKind::Action);

        let entry = registry.find(&InteractionPayload::new("a")).unwrap();
        assert_eq!(tag_of(entry), json!("first"));

        let entry = registry.find(&InteractionPayload::new("b")).unwrap();
        assert_eq!(tag_of(entry), json!("second"));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let handler = tagged("same");
        let mut registry = CallbackRegistry::new();
        registry
            .register(Constraints::new().callback_id("a"), handler.clone(), EntryKind::Action)
            .register(Constraints::new().callback_id("a"), handler, EntryKind::Action);

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry
                .iter()
                .filter(|e| e.matches(&InteractionPayload::new("a")))
                .count(),
            2
        );
    }
}
