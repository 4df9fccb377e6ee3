//! Arena-based DOM tree storage
//!
//! "Bad programmers worry about the code. Good programmers worry about
//! data structures and their relationships."
//!
//! Nodes live in a single Vec and refer to each other by index. Detached
//! nodes stay in the arena; they simply have no parent.
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Window][Document][html][head]...
//!           0        1      ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};
use ahash::AHashMap;

pub const WINDOW_ID: NodeId = 0;
pub const DOCUMENT_ID: NodeId = 1;

/// Arena allocator for DOM nodes
#[derive(Debug)]
pub struct DomArena {
    nodes: Vec<DomNode>,

    /// Backend node ID → NodeId lookup (for nodes loaded from snapshots)
    backend_id_map: AHashMap<u32, NodeId>,
}

impl DomArena {
    /// Create an arena holding only the window and an empty document
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut arena = Self {
            nodes: Vec::with_capacity(capacity.max(2)),
            backend_id_map: AHashMap::new(),
        };
        arena.push(NodeType::Window, "#window");
        arena.push(NodeType::Document, "#document");
        arena
    }

    fn push(&mut self, node_type: NodeType, name: &str) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        self.nodes
            .push(DomNode::new(node_id, node_type, name.to_string()));
        node_id
    }

    /// Create a detached element, tag name lowercased
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeType::Element, &tag.to_ascii_lowercase())
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let id = self.push(NodeType::Text, "#text");
        self.nodes[id as usize].node_value = text.to_string();
        id
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        let id = self.push(NodeType::Comment, "#comment");
        self.nodes[id as usize].node_value = text.to_string();
        id
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        let id = self.push(NodeType::DocumentType, "#doctype");
        self.nodes[id as usize].node_value = name.to_string();
        id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get element by ID, failing for non-element nodes
    pub fn element(&self, node_id: NodeId) -> Result<&DomNode> {
        let node = self.get(node_id)?;
        if node.is_element() {
            Ok(node)
        } else {
            Err(DomError::InvalidNodeType {
                expected: "Element".to_string(),
                actual: format!("{:?}", node.node_type),
            })
        }
    }

    /// Get element by ID (mutable), failing for non-element nodes
    pub fn element_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.element(node_id)?;
        self.get_mut(node_id)
    }

    /// Map a backend node ID to an existing node
    pub fn register_backend_id(&mut self, backend_id: u32, node_id: NodeId) {
        self.backend_id_map.insert(backend_id, node_id);
    }

    /// Get node ID by backend node ID
    pub fn get_node_id_by_backend(&self, backend_id: u32) -> Option<NodeId> {
        self.backend_id_map.get(&backend_id).copied()
    }

    pub fn window_id(&self) -> NodeId {
        WINDOW_ID
    }

    pub fn document_id(&self) -> NodeId {
        DOCUMENT_ID
    }

    /// Total number of nodes, window and document included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Arena always holds the window and document
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    /// Get parent ID of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.parent_id)
    }

    /// Get children of a node
    pub fn children(&self, node_id: NodeId) -> Result<Vec<&DomNode>> {
        let node = self.get(node_id)?;
        node.children_ids
            .iter()
            .map(|&child_id| self.get(child_id))
            .collect()
    }

    /// Element siblings before `node_id`, nearest first
    pub fn previous_element_siblings(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        let Some(parent_id) = self.parent(node_id)? else {
            return Ok(Vec::new());
        };
        let parent = self.get(parent_id)?;
        let mut siblings = Vec::new();
        for &child_id in &parent.children_ids {
            if child_id == node_id {
                break;
            }
            if self.get(child_id)?.is_element() {
                siblings.push(child_id);
            }
        }
        siblings.reverse();
        Ok(siblings)
    }

    /// Element children of a node
    pub fn element_children(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.get(node_id)?;
        let mut out = Vec::with_capacity(node.children_ids.len());
        for &child_id in &node.children_ids {
            if self.get(child_id)?.is_element() {
                out.push(child_id);
            }
        }
        Ok(out)
    }

    /// Whether `other` is `node_id` or one of its descendants
    pub fn contains(&self, node_id: NodeId, other: NodeId) -> Result<bool> {
        self.get(node_id)?;
        let mut cursor = Some(other);
        while let Some(current) = cursor {
            if current == node_id {
                return Ok(true);
            }
            cursor = self.get(current)?.parent_id;
        }
        Ok(false)
    }

    /// Append `child` as last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_type = self.get(parent)?.node_type;
        let child_type = self.get(child)?.node_type;

        let parent_accepts = matches!(
            parent_type,
            NodeType::Element | NodeType::Document | NodeType::DocumentFragment
        );
        let child_movable = !matches!(child_type, NodeType::Window | NodeType::Document);

        if !parent_accepts || !child_movable || self.contains(child, parent)? {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child)?;
        self.get_mut(parent)?.children_ids.push(child);
        self.get_mut(child)?.parent_id = Some(parent);
        Ok(())
    }

    /// Remove a node from its parent's children
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        if let Some(old_parent) = self.get_mut(node_id)?.parent_id.take() {
            self.get_mut(old_parent)?
                .children_ids
                .retain(|id| *id != node_id);
        }
        Ok(())
    }

    /// Detach every child of a node
    pub fn remove_children(&mut self, node_id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.get_mut(node_id)?.children_ids);
        for child_id in children {
            self.get_mut(child_id)?.parent_id = None;
        }
        Ok(())
    }

    /// Traverse tree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Element descendants of `root` in document order, root excluded
    pub fn descendant_elements(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        self.traverse_df(root, |node| {
            if node.node_id != root && node.is_element() {
                out.push(node.node_id);
            }
            Ok(())
        })?;
        Ok(out)
    }

    /// Concatenated character data of all descendant text nodes
    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        let node = self.get(node_id)?;
        if matches!(node.node_type, NodeType::Text | NodeType::Comment) {
            return Ok(node.node_value.clone());
        }

        let mut text = String::new();
        self.traverse_df(node_id, |node| {
            if node.node_type == NodeType::Text {
                text.push_str(&node.node_value);
            }
            Ok(())
        })?;
        Ok(text)
    }

    /// Find connected nodes matching predicate, in document order
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        let mut out = Vec::new();
        let _ = self.traverse_df(DOCUMENT_ID, |node| {
            if predicate(node) {
                out.push(node.node_id);
            }
            Ok(())
        });
        out
    }

    /// Find first connected node matching predicate
    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.find(predicate).into_iter().next()
    }

    /// Find all elements by tag name
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.find(|node| node.is_element() && node.node_name.eq_ignore_ascii_case(tag))
    }

    /// Find element by ID attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_one(|node| node.is_element() && node.attr("id") == Some(id))
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}
