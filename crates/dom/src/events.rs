//! Events - listener registry, dispatch and the mutation feed
//!
//! Two separate channels:
//! - DOM events (`click`, `load`, ...) go to listeners registered per node
//!   and run synchronously inside `dispatch`.
//! - Mutation records (`DomEvent`) are broadcast on the `EventBus` so any
//!   number of observers can follow what changed, in order.

use crate::types::NodeId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event handler shared by every node and event name it is registered for
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// A DOM event as seen by a listener
#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    bubbles: bool,
    target: NodeId,
    current_target: NodeId,
    stopped: Arc<AtomicBool>,
}

impl Event {
    /// Non-bubbling event, like `new Event(name)`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bubbles: false,
            target: 0,
            current_target: 0,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Event that propagates from the target up to the window
    pub fn bubbling(name: impl Into<String>) -> Self {
        Self {
            bubbles: true,
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Node the event was dispatched to
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose listener is currently running
    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    /// Stop propagation to further nodes; listeners on the current node still run
    pub fn stop_propagation(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub(crate) fn at(&self, target: NodeId, current_target: NodeId) -> Self {
        Self {
            target,
            current_target,
            ..self.clone()
        }
    }
}

type ListenerKey = (NodeId, String);

/// Listeners per (node, event name), in registration order
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: DashMap<ListenerKey, SmallVec<[Listener; 2]>, ahash::RandomState>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; the same handler twice for one key is ignored
    pub fn add(&self, node_id: NodeId, name: &str, listener: Listener) -> bool {
        let mut entry = self
            .listeners
            .entry((node_id, name.to_string()))
            .or_default();
        if entry.iter().any(|existing| Arc::ptr_eq(existing, &listener)) {
            return false;
        }
        entry.push(listener);
        true
    }

    /// Snapshot of the listeners for a key
    ///
    /// Cloned out so no map guard is held while handlers run.
    pub fn get(&self, node_id: NodeId, name: &str) -> SmallVec<[Listener; 2]> {
        self.listeners
            .get(&(node_id, name.to_string()))
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn count(&self, node_id: NodeId, name: &str) -> usize {
        self.listeners
            .get(&(node_id, name.to_string()))
            .map(|entry| entry.len())
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("keys", &self.listeners.len())
            .finish()
    }
}

/// Mutation records published on the document's bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomEvent {
    AttributeChanged {
        node: NodeId,
        name: String,
        value: Option<String>,
    },
    ChildAppended {
        parent: NodeId,
        child: NodeId,
    },
    ChildrenReplaced {
        node: NodeId,
    },
    ValueChanged {
        node: NodeId,
        value: String,
    },
    EventDispatched {
        target: NodeId,
        name: String,
    },
    Loaded,
}

/// Simple event bus using tokio broadcast channel
pub struct EventBus {
    tx: broadcast::Sender<DomEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event
    pub fn publish(&self, event: DomEvent) {
        let _ = self.tx.send(event); // Ignore error if no subscribers
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<DomEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(DomEvent::Loaded);

        match rx.recv().await {
            Ok(DomEvent::Loaded) => {}
            _ => panic!("Expected Loaded event"),
        }
    }

    #[test]
    fn test_registry_keeps_order_and_dedups() {
        let registry = ListenerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let first: Listener = Arc::new(move |_: &Event| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let second: Listener = Arc::new(|_: &Event| {});

        assert!(registry.add(3, "click", first.clone()));
        assert!(registry.add(3, "click", second.clone()));
        assert!(!registry.add(3, "click", first.clone()));
        assert!(registry.add(4, "click", first.clone()));

        let listeners = registry.get(3, "click");
        assert_eq!(listeners.len(), 2);
        assert!(Arc::ptr_eq(&listeners[0], &first));
        assert_eq!(registry.count(3, "focus"), 0);

        listeners[0](&Event::new("click"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_propagation_shared_across_hops() {
        let event = Event::bubbling("click");
        let hop = event.at(5, 2);

        assert!(event.bubbles());
        assert_eq!(hop.target(), 5);
        assert_eq!(hop.current_target(), 2);

        hop.stop_propagation();
        assert!(event.propagation_stopped());
    }
}
