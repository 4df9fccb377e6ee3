//! HTML parsing into the arena
//!
//! html5ever does the tree building; markup5ever_rcdom gives us a plain
//! Rc tree that is copied into arena nodes.
//!
//! ```text
//! &str → html5ever → RcDom (Rc<Node>) → DomArena (u32 indices)
//! ```

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::NodeId;
use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_document, parse_fragment, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse a full document, appending its nodes under `document`
pub fn parse_document_into(arena: &mut DomArena, document: NodeId, html: &str) -> Result<()> {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);

    let children = dom.document.children.borrow();
    for child in children.iter() {
        copy_node(arena, document, child)?;
    }
    Ok(())
}

/// Parse a fragment as if assigned to `innerHTML` of a `context` element
///
/// Returns the new top-level nodes, detached and in order.
pub fn parse_fragment_nodes(arena: &mut DomArena, context: &str, html: &str) -> Result<Vec<NodeId>> {
    let context_name = if context.is_empty() {
        QualName::new(None, ns!(html), local_name!("body"))
    } else {
        QualName::new(None, ns!(html), LocalName::from(context))
    };
    let dom = parse_fragment(RcDom::default(), Default::default(), context_name, Vec::new()).one(html);

    // Fragment parsing wraps the result in a synthetic <html> element
    let document_children = dom.document.children.borrow();
    let Some(root) = document_children.first() else {
        return Ok(Vec::new());
    };

    let children = root.children.borrow();
    let mut out = Vec::with_capacity(children.len());
    for child in children.iter() {
        if let Some(id) = build_node(arena, child)? {
            out.push(id);
        }
    }
    Ok(out)
}

fn copy_node(arena: &mut DomArena, parent: NodeId, handle: &Handle) -> Result<()> {
    if let Some(id) = build_node(arena, handle)? {
        arena.append_child(parent, id)?;
    }
    Ok(())
}

/// Build a detached arena subtree from an rcdom node
fn build_node(arena: &mut DomArena, handle: &Handle) -> Result<Option<NodeId>> {
    let id = match &handle.data {
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let id = arena.create_element(&name.local);
            let element = arena.get_mut(id)?;
            for attr in attrs.borrow().iter() {
                element.set_attr(&attr.name.local, &attr.value);
            }

            // <template> content lives in a separate fragment in rcdom
            if let Some(contents) = template_contents.borrow().as_ref() {
                for child in contents.children.borrow().iter() {
                    copy_node(arena, id, child)?;
                }
            }
            id
        }
        NodeData::Text { contents } => arena.create_text(&contents.borrow()),
        NodeData::Comment { contents } => arena.create_comment(contents),
        NodeData::Doctype { name, .. } => arena.create_doctype(name),
        NodeData::Document | NodeData::ProcessingInstruction { .. } => return Ok(None),
    };

    for child in handle.children.borrow().iter() {
        copy_node(arena, id, child)?;
    }
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::DOCUMENT_ID;
    use crate::serializer::DomSerializer;

    #[test]
    fn test_parse_document() {
        let mut arena = DomArena::new();
        parse_document_into(
            &mut arena,
            DOCUMENT_ID,
            "<!DOCTYPE html><html><body><p id=a class='x y'>Hi <b>there</b></p></body></html>",
        )
        .unwrap();

        let p = arena.find_by_id("a").unwrap();
        let node = arena.get(p).unwrap();
        assert_eq!(node.node_name, "p");
        assert_eq!(node.attr("class"), Some("x y"));
        assert_eq!(arena.text_content(p).unwrap(), "Hi there");
        assert_eq!(arena.find_by_tag("head").len(), 1);
    }

    #[test]
    fn test_parse_fragment() {
        let mut arena = DomArena::new();
        let nodes = parse_fragment_nodes(&mut arena, "div", "text <i>one</i><!--c--><br>").unwrap();

        assert_eq!(nodes.len(), 4);
        assert!(nodes
            .iter()
            .all(|&id| arena.get(id).unwrap().parent_id.is_none()));
        assert_eq!(arena.get(nodes[1]).unwrap().node_name, "i");
    }

    #[test]
    fn test_fragment_in_table_context() {
        let mut arena = DomArena::new();
        let nodes = parse_fragment_nodes(&mut arena, "tr", "<td>1</td><td>2</td>").unwrap();

        assert_eq!(nodes.len(), 2);
        let serializer = DomSerializer::new();
        assert_eq!(serializer.outer_html(&arena, nodes[1]).unwrap(), "<td>2</td>");
    }
}
