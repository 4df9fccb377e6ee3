//! Chainable operations over a selection of document nodes
//!
//! A [`Wrapper`] pairs a [`Document`] handle with a [`Selection`]. Getters
//! read from the first resolved node; setters apply to every resolved node
//! and return `&Self` so calls can be chained with `?`.
//!
//! ```text
//! Selection::Selector("li.item")  → re-queried on every call
//! Selection::Single(id)           → fixed
//! Selection::Many([a, b, c])      → fixed
//! ```

use crate::error::{Error, Result};
use dom::{Document, Event, Listener, NodeId, Offset};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Class toggled by [`Wrapper::active`]
pub const ACTIVE_CLASS: &str = "active";

/// Attribute holding the display value saved by [`Wrapper::hide`]
pub const DISPLAY_CACHE_ATTR: &str = "dp-cache-display";

/// What a wrapper points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// CSS selector resolved against the live document on each call
    Selector(String),
    Single(NodeId),
    Many(SmallVec<[NodeId; 4]>),
}

impl Selection {
    pub fn empty() -> Self {
        Selection::Many(SmallVec::new())
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Selector(selector) => write!(f, "'{}'", selector),
            Selection::Single(id) => write!(f, "node {}", id),
            Selection::Many(ids) => write!(f, "{} fixed nodes", ids.len()),
        }
    }
}

impl From<&str> for Selection {
    fn from(selector: &str) -> Self {
        Selection::Selector(selector.to_string())
    }
}

impl From<String> for Selection {
    fn from(selector: String) -> Self {
        Selection::Selector(selector)
    }
}

impl From<NodeId> for Selection {
    fn from(id: NodeId) -> Self {
        Selection::Single(id)
    }
}

impl From<Vec<NodeId>> for Selection {
    fn from(ids: Vec<NodeId>) -> Self {
        Selection::Many(SmallVec::from_vec(ids))
    }
}

impl From<&[NodeId]> for Selection {
    fn from(ids: &[NodeId]) -> Self {
        Selection::Many(SmallVec::from_slice(ids))
    }
}

#[derive(Debug, Clone)]
pub struct Wrapper {
    document: Document,
    selection: Selection,
}

impl Wrapper {
    pub fn new(document: &Document, selection: impl Into<Selection>) -> Self {
        Self {
            document: document.clone(),
            selection: selection.into(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The resolved sequence, in document order for selectors
    pub fn elements(&self) -> Result<Vec<NodeId>> {
        match &self.selection {
            Selection::Selector(selector) => Ok(self.document.query_selector_all(selector)?),
            Selection::Single(id) => Ok(vec![*id]),
            Selection::Many(ids) => Ok(ids.to_vec()),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.elements()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// First resolved node, or `EmptySelection`
    pub fn first(&self) -> Result<NodeId> {
        let first = match &self.selection {
            Selection::Selector(selector) => self.document.query_selector(selector)?,
            Selection::Single(id) => Some(*id),
            Selection::Many(ids) => ids.first().copied(),
        };
        first.ok_or_else(|| Error::EmptySelection(self.selection.to_string()))
    }

    fn each(&self, mut apply: impl FnMut(NodeId) -> Result<()>) -> Result<&Self> {
        let elements = self.elements()?;
        trace!(selection = %self.selection, count = elements.len(), "Applying to selection");
        for id in elements {
            apply(id)?;
        }
        Ok(self)
    }

    fn derive(&self, selection: Selection) -> Wrapper {
        Wrapper {
            document: self.document.clone(),
            selection,
        }
    }

    /// Descendants of the first node matching `selector`
    pub fn find(&self, selector: &str) -> Result<Wrapper> {
        let first = self.first()?;
        let found = self.document.query_selector_all_from(first, selector)?;
        Ok(self.derive(found.into()))
    }

    /// Parent of the first node; empty when it has none
    pub fn parent(&self) -> Result<Wrapper> {
        let parent = self.document.parent(self.first()?)?;
        Ok(self.derive(parent.map_or_else(Selection::empty, Selection::Single)))
    }

    /// Bounding-box height of the first node, viewport height without a box
    pub fn height(&self) -> Result<f64> {
        let rect = self.document.bounding_rect(self.first()?)?;
        Ok(rect.unwrap_or_else(|| self.document.viewport()).height)
    }

    pub fn set_height(&self, value: &str) -> Result<&Self> {
        self.set_css("height", value)
    }

    /// Bounding-box width of the first node, viewport width without a box
    pub fn width(&self) -> Result<f64> {
        let rect = self.document.bounding_rect(self.first()?)?;
        Ok(rect.unwrap_or_else(|| self.document.viewport()).width)
    }

    pub fn set_width(&self, value: &str) -> Result<&Self> {
        self.set_css("width", value)
    }

    pub fn add_class(&self, name: &str) -> Result<&Self> {
        self.each(|id| Ok(self.document.add_class(id, name)?))
    }

    pub fn remove_class(&self, name: &str) -> Result<&Self> {
        self.each(|id| Ok(self.document.remove_class(id, name)?))
    }

    pub fn has_class(&self, name: &str) -> Result<bool> {
        Ok(self.document.has_class(self.first()?, name)?)
    }

    pub fn is_active(&self) -> Result<bool> {
        self.has_class(ACTIVE_CLASS)
    }

    pub fn active(&self, status: bool) -> Result<&Self> {
        if status {
            self.add_class(ACTIVE_CLASS)
        } else {
            self.remove_class(ACTIVE_CLASS)
        }
    }

    /// Inline style property of the first node, `""` when unset
    pub fn css(&self, key: &str) -> Result<String> {
        Ok(self.document.style_property(self.first()?, key)?)
    }

    pub fn set_css(&self, key: &str, value: &str) -> Result<&Self> {
        self.each(|id| Ok(self.document.set_style_property(id, key, value)?))
    }

    /// Set several style properties on every node
    pub fn set_css_map<I, K, V>(&self, properties: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let properties: Vec<(K, V)> = properties.into_iter().collect();
        self.each(|id| {
            for (key, value) in &properties {
                self.document
                    .set_style_property(id, key.as_ref(), value.as_ref())?;
            }
            Ok(())
        })
    }

    pub fn attr(&self, key: &str) -> Result<Option<String>> {
        Ok(self.document.attribute(self.first()?, key)?)
    }

    pub fn set_attr(&self, key: &str, value: &str) -> Result<&Self> {
        self.each(|id| Ok(self.document.set_attribute(id, key, value)?))
    }

    /// Set several attributes; every key lands on one node before the next
    pub fn set_attrs<I, K, V>(&self, attributes: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let attributes: Vec<(K, V)> = attributes.into_iter().collect();
        self.each(|id| {
            for (key, value) in &attributes {
                self.document
                    .set_attribute(id, key.as_ref(), value.as_ref())?;
            }
            Ok(())
        })
    }

    pub fn html(&self) -> Result<String> {
        Ok(self.document.inner_html(self.first()?)?)
    }

    pub fn set_html(&self, value: &str) -> Result<&Self> {
        self.each(|id| Ok(self.document.set_inner_html(id, value)?))
    }

    pub fn text(&self) -> Result<String> {
        Ok(self.document.text_content(self.first()?)?)
    }

    pub fn set_text(&self, value: &str) -> Result<&Self> {
        self.each(|id| Ok(self.document.set_text_content(id, value)?))
    }

    /// Form value of the first node; `None` for nodes without one
    pub fn val(&self) -> Result<Option<String>> {
        Ok(self.document.value(self.first()?)?)
    }

    pub fn set_val(&self, value: &str) -> Result<&Self> {
        self.each(|id| Ok(self.document.set_value(id, value)?))
    }

    /// Attach `handler` for each event name on every node
    ///
    /// Names are separated by whitespace or commas.
    pub fn listen<F>(&self, events: &str, handler: F) -> Result<&Self>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.listen_with(events, Arc::new(handler))
    }

    /// Like [`Wrapper::listen`] with an already shared listener
    pub fn listen_with(&self, events: &str, listener: Listener) -> Result<&Self> {
        let names: Vec<&str> = events
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|name| !name.is_empty())
            .collect();
        self.each(|id| {
            for name in &names {
                self.document
                    .add_event_listener(id, name, Arc::clone(&listener))?;
            }
            Ok(())
        })
    }

    /// Edges of the first node's bounding box
    pub fn offset(&self) -> Result<Offset> {
        let rect = self.document.bounding_rect(self.first()?)?;
        Ok(rect.unwrap_or_else(|| self.document.viewport()).into())
    }

    /// Whether the first node is `node` or contains it
    pub fn has(&self, node: NodeId) -> Result<bool> {
        Ok(self.document.contains(self.first()?, node)?)
    }

    pub fn is(&self, node: NodeId) -> Result<bool> {
        Ok(self.first()? == node)
    }

    /// Nearest inclusive ancestor of the first node matching `selector`
    pub fn closest(&self, selector: &str) -> Result<Wrapper> {
        let found = self.document.closest(self.first()?, selector)?;
        Ok(self.derive(found.map_or_else(Selection::empty, Selection::Single)))
    }

    /// Append `node` to every resolved node; it ends up under the last one
    pub fn append(&self, node: NodeId) -> Result<&Self> {
        self.each(|id| Ok(self.document.append_child(id, node)?))
    }

    /// Save the first node's display value, then set `display: none` on all
    pub fn hide(&self) -> Result<&Self> {
        if self.is_empty()? {
            return Ok(self);
        }
        let display = self.css("display")?;
        if display != "none" {
            self.set_attr(DISPLAY_CACHE_ATTR, &display)?;
        } else if self.attr(DISPLAY_CACHE_ATTR)?.unwrap_or_default().is_empty() {
            self.set_attr(DISPLAY_CACHE_ATTR, "")?;
        }
        self.set_css("display", "none")
    }

    /// Restore the display value saved by [`Wrapper::hide`]
    ///
    /// Without a saved value the inline display is cleared.
    pub fn show(&self) -> Result<&Self> {
        if self.is_empty()? {
            return Ok(self);
        }
        let display = self.attr(DISPLAY_CACHE_ATTR)?.unwrap_or_default();
        self.set_css("display", &display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{DomError, DomEvent, DomRect};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn list_doc() -> Document {
        Document::parse_html(
            r#"<html><body>
                <ul id="list">
                    <li class="item">one</li>
                    <li class="item"><span>two</span></li>
                </ul>
                <div id="box" style="display: flex"><p>text</p></div>
                <input id="name" value="ada">
            </body></html>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_selector_wrapper_requeries() {
        let doc = list_doc();
        let items = Wrapper::new(&doc, "li.item");
        assert_eq!(items.len().unwrap(), 2);

        let list = doc.element_by_id("list").unwrap();
        let extra = doc.create_element("li");
        doc.add_class(extra, "item").unwrap();
        doc.append_child(list, extra).unwrap();

        assert_eq!(items.len().unwrap(), 3);
        assert_eq!(items.elements().unwrap().last(), Some(&extra));
    }

    #[test]
    fn test_fixed_wrapper_does_not_requery() {
        let doc = list_doc();
        let items = Wrapper::new(&doc, doc.query_selector_all("li.item").unwrap());
        assert_eq!(items.len().unwrap(), 2);

        let list = doc.element_by_id("list").unwrap();
        let extra = doc.create_element("li");
        doc.add_class(extra, "item").unwrap();
        doc.append_child(list, extra).unwrap();

        assert_eq!(items.len().unwrap(), 2);
        assert!(!items.elements().unwrap().contains(&extra));
    }

    #[test]
    fn test_selection_conversions() {
        let ids = [3u32, 4];
        assert_eq!(Selection::from("a"), Selection::Selector("a".to_string()));
        assert_eq!(Selection::from(7u32), Selection::Single(7));
        assert_eq!(
            Selection::from(&ids[..]),
            Selection::from(vec![3u32, 4])
        );
    }

    #[test]
    fn test_class_ops_across_all() {
        let doc = list_doc();
        let items = Wrapper::new(&doc, "li");
        items.add_class("x").unwrap();
        for id in items.elements().unwrap() {
            assert!(doc.has_class(id, "x").unwrap());
        }
        assert!(items.has_class("x").unwrap());

        items.remove_class("x").unwrap().remove_class("x").unwrap();
        assert!(!items.has_class("x").unwrap());
        assert!(items.has_class("item").unwrap());
    }

    #[test]
    fn test_active_toggle() {
        let doc = list_doc();
        let items = Wrapper::new(&doc, "li");
        assert!(!items.is_active().unwrap());

        items.active(true).unwrap();
        assert!(items.is_active().unwrap());
        let second = items.elements().unwrap()[1];
        assert!(doc.has_class(second, ACTIVE_CLASS).unwrap());

        items.active(false).unwrap();
        assert!(!items.is_active().unwrap());
    }

    #[test]
    fn test_css_get_set() {
        let doc = list_doc();
        let items = Wrapper::new(&doc, "li");
        assert_eq!(items.css("color").unwrap(), "");

        items
            .set_css_map([("color", "red"), ("fontSize", "2px")])
            .unwrap();
        for id in items.elements().unwrap() {
            assert_eq!(doc.style_property(id, "color").unwrap(), "red");
            assert_eq!(doc.style_property(id, "font-size").unwrap(), "2px");
        }
        assert_eq!(items.css("fontSize").unwrap(), "2px");

        items.set_css("color", "blue").unwrap();
        assert_eq!(items.css("color").unwrap(), "blue");
    }

    #[test]
    fn test_attr_get_set() {
        let doc = list_doc();
        let items = Wrapper::new(&doc, "li");
        items.set_attr("data-k", "v").unwrap();
        assert_eq!(items.attr("data-k").unwrap().as_deref(), Some("v"));
        assert_eq!(items.attr("data-missing").unwrap(), None);

        assert!(matches!(
            items.set_attr("bad name", "v"),
            Err(Error::Dom(DomError::InvalidAttributeName(_)))
        ));
    }

    #[tokio::test]
    async fn test_set_attrs_order() {
        let doc = list_doc();
        let items = Wrapper::new(&doc, "li");
        let ids = items.elements().unwrap();
        let mut feed = doc.subscribe();

        items.set_attrs([("data-a", "1"), ("data-b", "2")]).unwrap();

        let mut seen = Vec::new();
        while let Ok(event) = feed.try_recv() {
            if let DomEvent::AttributeChanged { node, name, .. } = event {
                seen.push((node, name));
            }
        }
        assert_eq!(
            seen,
            vec![
                (ids[0], "data-a".to_string()),
                (ids[0], "data-b".to_string()),
                (ids[1], "data-a".to_string()),
                (ids[1], "data-b".to_string()),
            ]
        );
    }

    #[test]
    fn test_html_and_text() {
        let doc = list_doc();
        let items = Wrapper::new(&doc, "li");
        assert_eq!(items.text().unwrap(), "one");
        assert_eq!(items.html().unwrap(), "one");

        items.set_html("<b>bold</b>").unwrap();
        for id in items.elements().unwrap() {
            assert_eq!(doc.inner_html(id).unwrap(), "<b>bold</b>");
        }
        assert_eq!(Wrapper::new(&doc, "li b").len().unwrap(), 2);

        items.set_text("<plain>").unwrap();
        assert_eq!(items.text().unwrap(), "<plain>");
        assert_eq!(items.html().unwrap(), "&lt;plain&gt;");
    }

    #[test]
    fn test_val() {
        let doc = list_doc();
        let input = Wrapper::new(&doc, "#name");
        assert_eq!(input.val().unwrap().as_deref(), Some("ada"));

        input.set_val("grace").unwrap();
        assert_eq!(input.val().unwrap().as_deref(), Some("grace"));
        assert_eq!(input.attr("value").unwrap().as_deref(), Some("ada"));
    }

    #[test]
    fn test_listen_once_per_element() {
        let doc = list_doc();
        let items = Wrapper::new(&doc, "li");
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        items
            .listen("click", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        for id in items.elements().unwrap() {
            doc.dispatch_event(id, Event::new("click")).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listen_splits_names() {
        let doc = list_doc();
        let items = Wrapper::new(&doc, "li");
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        items
            .listen("  focus   blur ", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        let first = items.first().unwrap();
        assert_eq!(doc.listener_count(first, "focus"), 1);
        assert_eq!(doc.listener_count(first, "blur"), 1);
        assert_eq!(doc.listener_count(first, ""), 0);

        doc.dispatch_event(first, Event::new("blur")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listen_splits_on_commas() {
        let doc = list_doc();
        let items = Wrapper::new(&doc, "li");
        items.listen("click,focus", |_| {}).unwrap();
        items.listen(" keyup, keydown\tinput ,", |_| {}).unwrap();

        let first = items.first().unwrap();
        for name in ["click", "focus", "keyup", "keydown", "input"] {
            assert_eq!(doc.listener_count(first, name), 1, "{name}");
        }
        assert_eq!(doc.listener_count(first, "click,focus"), 0);
        assert_eq!(doc.listener_count(first, ""), 0);
    }

    #[test]
    fn test_find_descendants_in_order() {
        let doc = list_doc();
        let list = Wrapper::new(&doc, "#list");
        let found = list.find("li, span").unwrap();

        let li = doc.query_selector_all("li").unwrap();
        let span = doc.query_selector("span").unwrap().unwrap();
        assert_eq!(found.elements().unwrap(), vec![li[0], li[1], span]);

        let body_find = Wrapper::new(&doc, "body").find("li").unwrap();
        assert_eq!(body_find.elements().unwrap(), li);
    }

    #[test]
    fn test_parent_and_closest() {
        let doc = list_doc();
        let span = Wrapper::new(&doc, "span");
        let li = doc.query_selector_all("li").unwrap()[1];

        assert!(span.parent().unwrap().is(li).unwrap());
        let list = span.closest("ul").unwrap();
        assert_eq!(list.attr("id").unwrap().as_deref(), Some("list"));
        assert!(span.closest("table").unwrap().is_empty().unwrap());

        let window = Wrapper::new(&doc, doc.window());
        assert!(window.parent().unwrap().is_empty().unwrap());
    }

    #[test]
    fn test_has_and_is() {
        let doc = list_doc();
        let list = Wrapper::new(&doc, "#list");
        let span = doc.query_selector("span").unwrap().unwrap();
        let input = doc.element_by_id("name").unwrap();

        assert!(list.has(span).unwrap());
        assert!(!list.has(input).unwrap());
        assert!(Wrapper::new(&doc, "#name").is(input).unwrap());
        assert!(!list.is(input).unwrap());
    }

    #[test]
    fn test_append_moves_node() {
        let doc = list_doc();
        let item = doc.create_element("li");
        Wrapper::new(&doc, "#list").append(item).unwrap();
        assert_eq!(Wrapper::new(&doc, "li").len().unwrap(), 3);

        let both = Wrapper::new(&doc, "li.item");
        let last = both.elements().unwrap()[1];
        let badge = doc.create_element("em");
        both.append(badge).unwrap();
        assert_eq!(doc.parent(badge).unwrap(), Some(last));
    }

    #[test]
    fn test_geometry() {
        let doc = list_doc();
        let boxed = Wrapper::new(&doc, "#box");
        let id = boxed.first().unwrap();

        assert_eq!(boxed.height().unwrap(), 0.0);
        doc.set_layout(id, DomRect::new(10.0, 20.0, 30.0, 40.0)).unwrap();
        assert_eq!(boxed.width().unwrap(), 30.0);
        assert_eq!(boxed.height().unwrap(), 40.0);

        let offset = boxed.offset().unwrap();
        assert_eq!(
            (offset.left, offset.top, offset.right, offset.bottom),
            (10.0, 20.0, 40.0, 60.0)
        );

        boxed.set_height("50px").unwrap().set_width("20%").unwrap();
        assert_eq!(boxed.css("height").unwrap(), "50px");
        assert_eq!(boxed.css("width").unwrap(), "20%");

        let window = Wrapper::new(&doc, doc.window());
        assert_eq!(window.width().unwrap(), doc.config().viewport_width);
        assert_eq!(window.height().unwrap(), doc.config().viewport_height);
    }

    #[test]
    fn test_geometry_from_snapshot_layout() {
        let doc = Document::from_snapshot(&serde_json::json!({
            "root": {
                "nodeType": 9,
                "nodeName": "#document",
                "children": [{
                    "nodeType": 1,
                    "nodeName": "DIV",
                    "attributes": ["class", "card"],
                    "layout": { "x": 5.0, "y": 8.0, "width": 120.0, "height": 30.0 }
                }]
            }
        }))
        .unwrap();

        let card = Wrapper::new(&doc, ".card");
        assert_eq!(card.width().unwrap(), 120.0);
        assert_eq!(card.height().unwrap(), 30.0);
        let offset = card.offset().unwrap();
        assert_eq!((offset.right, offset.bottom), (125.0, 38.0));
    }

    #[test]
    fn test_hide_show_restores_display() {
        let doc = list_doc();
        let boxed = Wrapper::new(&doc, "#box");
        boxed.hide().unwrap();
        assert_eq!(boxed.css("display").unwrap(), "none");
        assert_eq!(boxed.attr(DISPLAY_CACHE_ATTR).unwrap().as_deref(), Some("flex"));

        // a second hide keeps the saved value
        boxed.hide().unwrap();
        boxed.show().unwrap();
        assert_eq!(boxed.css("display").unwrap(), "flex");

        let items = Wrapper::new(&doc, "li");
        items.hide().unwrap();
        assert_eq!(items.css("display").unwrap(), "none");
        items.show().unwrap();
        assert_eq!(items.css("display").unwrap(), "");
        assert_eq!(items.attr("style").unwrap(), None);
    }

    #[test]
    fn test_hide_initially_hidden() {
        let doc = Document::parse_html(r#"<div id="d" style="display:none"></div>"#).unwrap();
        let div = Wrapper::new(&doc, "#d");
        div.hide().unwrap();
        assert_eq!(div.attr(DISPLAY_CACHE_ATTR).unwrap().as_deref(), Some(""));
        div.show().unwrap();
        assert_eq!(div.css("display").unwrap(), "");
    }

    #[test]
    fn test_show_without_cache_clears_display() {
        let doc = Document::parse_html(
            r#"<div id="d" style="display:none; color: red"></div>"#,
        )
        .unwrap();
        let div = Wrapper::new(&doc, "#d");
        assert_eq!(div.attr(DISPLAY_CACHE_ATTR).unwrap(), None);

        div.show().unwrap();
        assert_eq!(div.css("display").unwrap(), "");
        assert_eq!(div.css("color").unwrap(), "red");
    }

    #[test]
    fn test_empty_selection() {
        let doc = list_doc();
        let none = Wrapper::new(&doc, ".missing");
        assert!(none.is_empty().unwrap());

        assert!(matches!(none.text(), Err(Error::EmptySelection(_))));
        assert!(matches!(none.attr("id"), Err(Error::EmptySelection(_))));
        assert!(matches!(none.height(), Err(Error::EmptySelection(_))));
        assert!(matches!(none.find("li"), Err(Error::EmptySelection(_))));

        none.add_class("x").unwrap().set_css("color", "red").unwrap();
        none.hide().unwrap().show().unwrap();
        none.listen("click", |_| {}).unwrap();

        let fixed = Wrapper::new(&doc, Vec::<NodeId>::new());
        assert!(matches!(fixed.first(), Err(Error::EmptySelection(_))));
    }

    #[test]
    fn test_invalid_selector() {
        let doc = list_doc();
        let bad = Wrapper::new(&doc, "li[");
        assert!(matches!(
            bad.elements(),
            Err(Error::Dom(DomError::InvalidSelector(_)))
        ));
        assert!(matches!(
            bad.text(),
            Err(Error::Dom(DomError::InvalidSelector(_)))
        ));
    }
}
