//! DOM Serializer - Convert arena subtrees back to HTML markup
//!
//! Follows the HTML fragment serialization rules closely enough for
//! `innerHTML` round trips:
//! - Text escapes `&`, `<`, `>` and no-break spaces
//! - Attribute values escape `&`, `"` and no-break spaces
//! - Void elements get no closing tag
//! - Raw text elements (`script`, `style`, ...) keep their text verbatim

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;

/// Serializer configuration
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// Emit `<!--...-->` for comment nodes
    pub include_comments: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            include_comments: true,
        }
    }
}

/// HTML serializer
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Serialize the children of a node (`innerHTML`)
    pub fn inner_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let node = arena.get(node_id)?;
        let raw = node
            .tag_name()
            .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));

        let mut output = String::new();
        for &child_id in &node.children_ids {
            self.serialize_node(arena, child_id, raw, &mut output)?;
        }
        Ok(output)
    }

    /// Serialize a node including itself (`outerHTML`)
    pub fn outer_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::new();
        self.serialize_node(arena, node_id, false, &mut output)?;
        Ok(output)
    }

    fn serialize_node(
        &self,
        arena: &DomArena,
        node_id: NodeId,
        raw_parent: bool,
        output: &mut String,
    ) -> Result<()> {
        let node = arena.get(node_id)?;

        match node.node_type {
            NodeType::Element => {
                output.push('<');
                output.push_str(&node.node_name);
                for (name, value) in &node.attributes {
                    output.push(' ');
                    output.push_str(name);
                    output.push_str("=\"");
                    escape_into(value, true, output);
                    output.push('"');
                }
                output.push('>');

                if VOID_ELEMENTS.contains(&node.node_name.as_str()) {
                    return Ok(());
                }

                output.push_str(&self.inner_html(arena, node_id)?);

                output.push_str("</");
                output.push_str(&node.node_name);
                output.push('>');
            }
            NodeType::Text if raw_parent => output.push_str(&node.node_value),
            NodeType::Text => escape_into(&node.node_value, false, output),
            NodeType::Comment if self.config.include_comments => {
                output.push_str("<!--");
                output.push_str(&node.node_value);
                output.push_str("-->");
            }
            NodeType::DocumentType => {
                output.push_str("<!DOCTYPE ");
                output.push_str(&node.node_value);
                output.push('>');
            }
            NodeType::Document | NodeType::DocumentFragment => {
                output.push_str(&self.inner_html(arena, node_id)?);
            }
            _ => {}
        }

        Ok(())
    }
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_into(text: &str, attribute: bool, output: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '"' if attribute => output.push_str("&quot;"),
            '<' if !attribute => output.push_str("&lt;"),
            '>' if !attribute => output.push_str("&gt;"),
            _ => output.push(ch),
        }
    }
}
