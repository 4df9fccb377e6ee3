//! Document - main entry point for DOM operations
//!
//! A `Document` is a cheap, cloneable handle. Every clone sees the same
//! tree, listeners and mutation feed, so the handle can be passed around
//! explicitly wherever a global `document`/`window` would otherwise be used.
//!
//! Locking rule: the arena lock is held only inside a single operation and
//! never while listeners run, so handlers may call back into the document.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::events::{DomEvent, Event, EventBus, Listener, ListenerRegistry};
use crate::parser;
use crate::selector::Selector;
use crate::serializer::DomSerializer;
use crate::style::{self, InlineStyle};
use crate::types::*;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};
use uuid::Uuid;

/// Configuration for a document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Viewport width reported for nodes without a layout box
    pub viewport_width: f64,
    /// Viewport height reported for nodes without a layout box
    pub viewport_height: f64,
    /// Buffered mutation records per subscriber before lagging
    pub event_capacity: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 720.0,
            event_capacity: 1024,
        }
    }
}

struct DocumentInner {
    id: Uuid,
    config: DocumentConfig,
    arena: RwLock<DomArena>,
    listeners: ListenerRegistry,
    bus: EventBus,
    loaded: AtomicBool,
    serializer: DomSerializer,
}

/// Shared handle to an in-memory document and its window
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

impl Document {
    /// Create an empty document with default config
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Create an empty document with custom config
    pub fn with_config(config: DocumentConfig) -> Self {
        Self::from_arena(DomArena::new(), config)
    }

    pub(crate) fn from_arena(arena: DomArena, config: DocumentConfig) -> Self {
        let id = Uuid::now_v7();
        debug!(document = %id, nodes = arena.len(), "Created document");
        Self {
            inner: Arc::new(DocumentInner {
                id,
                bus: EventBus::with_capacity(config.event_capacity),
                config,
                arena: RwLock::new(arena),
                listeners: ListenerRegistry::new(),
                loaded: AtomicBool::new(false),
                serializer: DomSerializer::new(),
            }),
        }
    }

    /// Parse a full HTML document
    pub fn parse_html(html: &str) -> Result<Self> {
        Self::parse_html_with_config(html, DocumentConfig::default())
    }

    pub fn parse_html_with_config(html: &str, config: DocumentConfig) -> Result<Self> {
        let mut arena = DomArena::new();
        let root = arena.document_id();
        parser::parse_document_into(&mut arena, root, html)?;
        Ok(Self::from_arena(arena, config))
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.inner.config
    }

    /// Whether two handles point at the same document
    pub fn same_document(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run a closure against the arena under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&DomArena) -> R) -> R {
        f(&self.inner.arena.read())
    }

    /// The window-equivalent event target
    pub fn window(&self) -> NodeId {
        self.read(|arena| arena.window_id())
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        self.read(|arena| arena.document_id())
    }

    /// First element child of the document (`<html>`)
    pub fn document_element(&self) -> Option<NodeId> {
        self.read(|arena| {
            arena
                .element_children(arena.document_id())
                .ok()
                .and_then(|children| children.first().copied())
        })
    }

    pub fn body(&self) -> Option<NodeId> {
        self.read(|arena| arena.find_by_tag("body").first().copied())
    }

    pub fn node_type(&self, node_id: NodeId) -> Result<NodeType> {
        self.read(|arena| Ok(arena.get(node_id)?.node_type))
    }

    /// Node loaded from a snapshot, looked up by its backend node ID
    pub fn node_by_backend_id(&self, backend_id: u32) -> Option<NodeId> {
        self.read(|arena| arena.get_node_id_by_backend(backend_id))
    }

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner.arena.write().create_element(tag)
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        self.inner.arena.write().create_text(text)
    }

    /// First element matching `selector`, in document order
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        self.read(|arena| selector.query_first(arena, arena.document_id()))
    }

    /// Every element matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all_from(self.root(), selector)
    }

    /// Matching descendants of `root`, in document order
    pub fn query_selector_all_from(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        self.read(|arena| selector.query_all(arena, root))
    }

    /// Nearest inclusive ancestor of `node_id` matching `selector`
    pub fn closest(&self, node_id: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        self.read(|arena| {
            arena.element(node_id)?;
            selector.closest(arena, node_id)
        })
    }

    pub fn matches(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        let selector = Selector::parse(selector)?;
        self.read(|arena| {
            arena.element(node_id)?;
            Ok(selector.matches(arena, node_id))
        })
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.read(|arena| arena.find_by_id(id))
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.read(|arena| arena.find_by_tag(tag))
    }

    pub fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        self.read(|arena| arena.parent(node_id))
    }

    pub fn children(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        self.read(|arena| Ok(arena.get(node_id)?.children_ids.to_vec()))
    }

    /// Whether `other` is `node_id` or one of its descendants
    pub fn contains(&self, node_id: NodeId, other: NodeId) -> Result<bool> {
        self.read(|arena| arena.contains(node_id, other))
    }

    /// Append `child` to `parent`, moving it out of any previous parent
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.inner.arena.write().append_child(parent, child)?;
        trace!(parent, child, "Appended child");
        self.inner
            .bus
            .publish(DomEvent::ChildAppended { parent, child });
        Ok(())
    }

    pub fn attribute(&self, node_id: NodeId, name: &str) -> Result<Option<String>> {
        self.read(|arena| Ok(arena.element(node_id)?.attr(name).map(String::from)))
    }

    pub fn set_attribute(&self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || "\"'>/=".contains(c)) {
            return Err(DomError::InvalidAttributeName(name.to_string()));
        }
        self.inner
            .arena
            .write()
            .element_mut(node_id)?
            .set_attr(name, value);
        self.publish_attribute(node_id, name, Some(value.to_string()));
        Ok(())
    }

    pub fn remove_attribute(&self, node_id: NodeId, name: &str) -> Result<()> {
        let removed = self
            .inner
            .arena
            .write()
            .element_mut(node_id)?
            .remove_attr(name);
        if removed {
            self.publish_attribute(node_id, name, None);
        }
        Ok(())
    }

    fn publish_attribute(&self, node: NodeId, name: &str, value: Option<String>) {
        trace!(node, name, ?value, "Attribute changed");
        self.inner.bus.publish(DomEvent::AttributeChanged {
            node,
            name: name.to_string(),
            value,
        });
    }

    pub fn has_class(&self, node_id: NodeId, name: &str) -> Result<bool> {
        self.read(|arena| {
            Ok(style::class_contains(
                arena.element(node_id)?.attr("class"),
                name,
            ))
        })
    }

    /// Add a class; no-op if already present
    pub fn add_class(&self, node_id: NodeId, name: &str) -> Result<()> {
        self.update_attribute(node_id, "class", |current| {
            style::class_add(current, name).map(Some)
        })
    }

    /// Remove a class; no-op if absent
    pub fn remove_class(&self, node_id: NodeId, name: &str) -> Result<()> {
        self.update_attribute(node_id, "class", |current| {
            style::class_remove(current, name).map(Some)
        })
    }

    /// Inline style property, empty string when unset
    pub fn style_property(&self, node_id: NodeId, name: &str) -> Result<String> {
        let current = self.attribute(node_id, "style")?;
        Ok(InlineStyle::parse(current.as_deref().unwrap_or(""))
            .get(name)
            .to_string())
    }

    /// Set an inline style property; an empty value removes it
    pub fn set_style_property(&self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        self.update_attribute(node_id, "style", |current| {
            let mut inline = InlineStyle::parse(current.unwrap_or(""));
            inline.set(name, value);
            Some(inline.to_attr())
        })
    }

    /// Read-modify-write of one attribute under a single write lock
    ///
    /// `update` returns `None` to leave the attribute alone and `Some(None)`
    /// to remove it. The record is published after the lock is released.
    fn update_attribute(
        &self,
        node_id: NodeId,
        name: &str,
        update: impl FnOnce(Option<&str>) -> Option<Option<String>>,
    ) -> Result<()> {
        let change = {
            let mut arena = self.inner.arena.write();
            let node = arena.element_mut(node_id)?;
            match update(node.attr(name)) {
                None => None,
                Some(Some(value)) => {
                    node.set_attr(name, &value);
                    Some(Some(value))
                }
                Some(None) => node.remove_attr(name).then_some(None),
            }
        };
        if let Some(value) = change {
            self.publish_attribute(node_id, name, value);
        }
        Ok(())
    }

    pub fn inner_html(&self, node_id: NodeId) -> Result<String> {
        self.read(|arena| self.inner.serializer.inner_html(arena, node_id))
    }

    pub fn outer_html(&self, node_id: NodeId) -> Result<String> {
        self.read(|arena| self.inner.serializer.outer_html(arena, node_id))
    }

    /// Replace the children of an element with parsed markup
    pub fn set_inner_html(&self, node_id: NodeId, html: &str) -> Result<()> {
        {
            let mut arena = self.inner.arena.write();
            let context = arena.element(node_id)?.node_name.clone();
            let nodes = parser::parse_fragment_nodes(&mut arena, &context, html)?;
            arena.remove_children(node_id)?;
            for child in nodes {
                arena.append_child(node_id, child)?;
            }
        }
        self.inner
            .bus
            .publish(DomEvent::ChildrenReplaced { node: node_id });
        Ok(())
    }

    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        self.read(|arena| arena.text_content(node_id))
    }

    /// Replace the children of a node with a single text node
    ///
    /// For text and comment nodes the character data is replaced instead.
    pub fn set_text_content(&self, node_id: NodeId, text: &str) -> Result<()> {
        {
            let mut arena = self.inner.arena.write();
            let node = arena.get_mut(node_id)?;
            if matches!(node.node_type, NodeType::Text | NodeType::Comment) {
                node.node_value = text.to_string();
            } else {
                arena.remove_children(node_id)?;
                if !text.is_empty() {
                    let child = arena.create_text(text);
                    arena.append_child(node_id, child)?;
                }
            }
        }
        self.inner
            .bus
            .publish(DomEvent::ChildrenReplaced { node: node_id });
        Ok(())
    }

    /// Current form value, `None` for elements that have none
    pub fn value(&self, node_id: NodeId) -> Result<Option<String>> {
        self.read(|arena| {
            let node = arena.get(node_id)?;
            if !node.is_element() {
                return Ok(None);
            }
            if let Some(value) = &node.value {
                return Ok(Some(value.clone()));
            }

            let value = match node.node_name.as_str() {
                "textarea" => Some(arena.text_content(node_id)?),
                "select" => {
                    let options: Vec<NodeId> = arena
                        .descendant_elements(node_id)?
                        .into_iter()
                        .filter(|&id| arena.get(id).is_ok_and(|n| n.node_name == "option"))
                        .collect();
                    let selected = options
                        .iter()
                        .copied()
                        .find(|&id| arena.get(id).is_ok_and(|n| n.attr("selected").is_some()))
                        .or_else(|| options.first().copied());
                    match selected {
                        Some(option) => Some(option_value(arena, option)?),
                        None => Some(String::new()),
                    }
                }
                "option" => Some(option_value(arena, node_id)?),
                "input" => Some(match node.attr("value") {
                    Some(value) => value.to_string(),
                    None if matches!(node.attr("type"), Some("checkbox" | "radio")) => {
                        "on".to_string()
                    }
                    None => String::new(),
                }),
                "button" | "data" | "param" => {
                    Some(node.attr("value").unwrap_or_default().to_string())
                }
                _ => None,
            };
            Ok(value)
        })
    }

    pub fn set_value(&self, node_id: NodeId, value: &str) -> Result<()> {
        self.inner.arena.write().element_mut(node_id)?.value = Some(value.to_string());
        self.inner.bus.publish(DomEvent::ValueChanged {
            node: node_id,
            value: value.to_string(),
        });
        Ok(())
    }

    /// Viewport rectangle from config
    pub fn viewport(&self) -> DomRect {
        DomRect::new(
            0.0,
            0.0,
            self.inner.config.viewport_width,
            self.inner.config.viewport_height,
        )
    }

    /// Bounding client rect, `None` for nodes that have no box
    ///
    /// Elements without a layout box report a zero rect.
    pub fn bounding_rect(&self, node_id: NodeId) -> Result<Option<DomRect>> {
        self.read(|arena| {
            let node = arena.get(node_id)?;
            if node.has_box() {
                Ok(Some(node.layout.unwrap_or_else(DomRect::zero)))
            } else {
                Ok(None)
            }
        })
    }

    /// Assign the layout box used by geometry queries
    pub fn set_layout(&self, node_id: NodeId, rect: DomRect) -> Result<()> {
        self.inner.arena.write().element_mut(node_id)?.layout = Some(rect);
        Ok(())
    }

    /// Register a listener for `name` on a node (or the window)
    pub fn add_event_listener(&self, node_id: NodeId, name: &str, listener: Listener) -> Result<()> {
        self.read(|arena| arena.get(node_id).map(|_| ()))?;
        if self.inner.listeners.add(node_id, name, listener) {
            debug!(node = node_id, event = name, "Registered listener");
        }
        Ok(())
    }

    pub fn listener_count(&self, node_id: NodeId, name: &str) -> usize {
        self.inner.listeners.count(node_id, name)
    }

    /// Dispatch an event to `target`, then up the tree if it bubbles
    pub fn dispatch_event(&self, target: NodeId, event: Event) -> Result<()> {
        let path = self.read(|arena| -> Result<Vec<NodeId>> {
            arena.get(target)?;
            let mut path = vec![target];
            if event.bubbles() {
                let mut cursor = arena.parent(target)?;
                while let Some(current) = cursor {
                    path.push(current);
                    cursor = arena.parent(current)?;
                }
                if path.last() == Some(&arena.document_id()) {
                    path.push(arena.window_id());
                }
            }
            Ok(path)
        })?;

        trace!(node = target, event = event.name(), hops = path.len(), "Dispatching event");
        self.inner.bus.publish(DomEvent::EventDispatched {
            target,
            name: event.name().to_string(),
        });

        for current in path {
            let hop = event.at(target, current);
            for listener in self.inner.listeners.get(current, event.name()) {
                listener(&hop);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        Ok(())
    }

    /// Fire `load` on the window; only the first call has an effect
    pub fn finish_loading(&self) -> Result<bool> {
        if self.inner.loaded.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        debug!(document = %self.inner.id, "Document loaded");
        self.dispatch_event(self.window(), Event::new("load"))?;
        self.inner.bus.publish(DomEvent::Loaded);
        Ok(true)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.load(Ordering::SeqCst)
    }

    /// Subscribe to mutation records
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<DomEvent> {
        self.inner.bus.subscribe()
    }
}

fn option_value(arena: &DomArena, option: NodeId) -> Result<String> {
    match arena.get(option)?.attr("value") {
        Some(value) => Ok(value.to_string()),
        None => Ok(arena
            .text_content(option)?
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")),
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.inner.id)
            .field("nodes", &self.read(|arena| arena.len()))
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
