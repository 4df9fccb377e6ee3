//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. Every fault the host document would raise
//! at runtime surfaces here as a value instead.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid attribute name: {0:?}")]
    InvalidAttributeName(String),

    #[error("Cannot append node {child} to node {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}
