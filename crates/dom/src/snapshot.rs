//! Snapshot loading - build a document from a serialized node tree
//!
//! Input format matches CDP's `DOM.getDocument` response, with an optional
//! `layout` box per node:
//! ```json
//! {
//!   "root": {
//!     "backendNodeId": 1,
//!     "nodeType": 9,
//!     "nodeName": "#document",
//!     "children": [{
//!       "nodeType": 1,
//!       "nodeName": "DIV",
//!       "attributes": ["id", "main"],
//!       "layout": { "x": 0, "y": 0, "width": 100, "height": 20 }
//!     }]
//!   }
//! }
//! ```

use crate::arena::DomArena;
use crate::document::{Document, DocumentConfig};
use crate::error::{DomError, Result};
use crate::types::*;
use serde_json::Value;
use tracing::warn;

impl Document {
    /// Load a document from a CDP-style snapshot
    pub fn from_snapshot(snapshot: &Value) -> Result<Self> {
        Self::from_snapshot_with_config(snapshot, DocumentConfig::default())
    }

    pub fn from_snapshot_with_config(snapshot: &Value, config: DocumentConfig) -> Result<Self> {
        let arena = parse_snapshot(snapshot)?;
        Ok(Self::from_arena(arena, config))
    }

    /// Load a document from snapshot JSON text
    pub fn from_snapshot_str(json: &str) -> Result<Self> {
        let snapshot: Value = serde_json::from_str(json)?;
        Self::from_snapshot(&snapshot)
    }
}

/// Build an arena from a snapshot; the root must be a document node
pub fn parse_snapshot(snapshot: &Value) -> Result<DomArena> {
    let root = snapshot
        .get("root")
        .ok_or_else(|| DomError::Snapshot("Missing 'root' in snapshot".to_string()))?;

    let root_type = node_type_of(root)?;
    if root_type != NodeType::Document {
        return Err(DomError::InvalidNodeType {
            expected: "Document".to_string(),
            actual: format!("{:?}", root_type),
        });
    }

    let mut arena = DomArena::new();
    let document = arena.document_id();
    if let Some(backend_id) = backend_id_of(root) {
        arena.get_mut(document)?.backend_node_id = Some(backend_id);
        arena.register_backend_id(backend_id, document);
    }

    if let Some(children) = root["children"].as_array() {
        for child in children {
            let child_id = parse_node(&mut arena, child)?;
            arena.append_child(document, child_id)?;
        }
    }

    Ok(arena)
}

fn node_type_of(node: &Value) -> Result<NodeType> {
    let node_type_val = node["nodeType"]
        .as_u64()
        .ok_or_else(|| DomError::Snapshot("Missing nodeType".to_string()))?;

    u8::try_from(node_type_val)
        .ok()
        .and_then(NodeType::from_u8)
        .ok_or_else(|| DomError::InvalidNodeType {
            expected: "valid NodeType".to_string(),
            actual: node_type_val.to_string(),
        })
}

fn backend_id_of(node: &Value) -> Option<u32> {
    node.get("backendNodeId")
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
}

/// Recursively parse a snapshot node into a detached subtree
fn parse_node(arena: &mut DomArena, value: &Value) -> Result<NodeId> {
    let node_type = node_type_of(value)?;
    let node_name = value["nodeName"].as_str().unwrap_or("");
    let node_value = value["nodeValue"].as_str().unwrap_or("");

    let node_id = match node_type {
        NodeType::Element => arena.create_element(node_name),
        NodeType::Text | NodeType::CdataSection => arena.create_text(node_value),
        NodeType::Comment => arena.create_comment(node_value),
        NodeType::DocumentType => arena.create_doctype(node_name),
        other => {
            return Err(DomError::InvalidNodeType {
                expected: "Element, Text, Comment or DocumentType".to_string(),
                actual: format!("{:?}", other),
            })
        }
    };

    if let Some(backend_id) = backend_id_of(value) {
        arena.get_mut(node_id)?.backend_node_id = Some(backend_id);
        arena.register_backend_id(backend_id, node_id);
    }

    // Attributes come flattened: [name0, value0, name1, value1, ...]
    if let Some(attrs) = value["attributes"].as_array() {
        if attrs.len() % 2 != 0 {
            warn!(node = node_id, "Odd-length attribute list, dropping trailing name");
        }
        let node = arena.get_mut(node_id)?;
        for pair in attrs.chunks_exact(2) {
            if let (Some(key), Some(val)) = (pair[0].as_str(), pair[1].as_str()) {
                node.set_attr(key, val);
            }
        }
    }

    if let Some(layout) = value.get("layout") {
        let rect: DomRect = serde_json::from_value(layout.clone())?;
        arena.get_mut(node_id)?.layout = Some(rect);
    }

    if let Some(children) = value["children"].as_array() {
        for child in children {
            let child_id = parse_node(arena, child)?;
            arena.append_child(node_id, child_id)?;
        }
    }

    Ok(node_id)
}
