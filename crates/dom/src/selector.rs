//! CSS selector engine
//!
//! Supports the subset callers reach for in practice: type, universal, id,
//! class and attribute conditions, a handful of structural pseudo-classes,
//! the four combinators and comma-separated groups.
//!
//! ```text
//! "ul.menu > li:not(.off) a[href^='/']"
//!   → [ul.menu] Child [li:not(.off)] Descendant [a[href^=/]]
//! ```

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
    EndsWith { key: String, value: String },
    Contains { key: String, value: String },
    Includes { key: String, value: String },
    DashMatch { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Not(Vec<Vec<Part>>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Step {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    pseudo_classes: Vec<PseudoClass>,
}

impl Step {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    step: Step,
    // Relation to the previous (left) part
    combinator: Option<Combinator>,
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    groups: Vec<Vec<Part>>,
}

impl Selector {
    /// Parse a selector list, e.g. `"div.a > span, #b"`
    pub fn parse(selector: &str) -> Result<Self> {
        let groups = parse_groups(selector)?;
        Ok(Self {
            source: selector.to_string(),
            groups,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the element matches any group of this selector
    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        matches_groups(&self.groups, arena, node_id)
    }

    /// Matching element descendants of `root` in document order
    pub fn query_all(&self, arena: &DomArena, root: NodeId) -> Result<Vec<NodeId>> {
        Ok(arena
            .descendant_elements(root)?
            .into_iter()
            .filter(|&candidate| self.matches(arena, candidate))
            .collect())
    }

    /// First matching element descendant of `root`
    pub fn query_first(&self, arena: &DomArena, root: NodeId) -> Result<Option<NodeId>> {
        let mut found = None;
        arena.traverse_df(root, |node| {
            if found.is_none()
                && node.node_id != root
                && node.is_element()
                && self.matches(arena, node.node_id)
            {
                found = Some(node.node_id);
            }
            Ok(())
        })?;
        Ok(found)
    }

    /// Nearest inclusive ancestor matching this selector
    pub fn closest(&self, arena: &DomArena, node_id: NodeId) -> Result<Option<NodeId>> {
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if self.matches(arena, current) {
                return Ok(Some(current));
            }
            cursor = arena.parent(current)?;
        }
        Ok(None)
    }
}

fn matches_groups(groups: &[Vec<Part>], arena: &DomArena, node_id: NodeId) -> bool {
    groups
        .iter()
        .any(|parts| matches_chain(arena, node_id, parts))
}

fn matches_chain(arena: &DomArena, node_id: NodeId, parts: &[Part]) -> bool {
    let Some(last) = parts.last() else {
        return false;
    };
    if !matches_step(arena, node_id, &last.step) {
        return false;
    }

    let mut current = node_id;
    for idx in (1..parts.len()).rev() {
        let prev_step = &parts[idx - 1].step;
        let combinator = parts[idx].combinator.unwrap_or(Combinator::Descendant);

        let matched = match combinator {
            Combinator::Child => parent_element(arena, current)
                .filter(|&parent| matches_step(arena, parent, prev_step)),
            Combinator::Descendant => {
                let mut cursor = parent_element(arena, current);
                let mut found = None;
                while let Some(parent) = cursor {
                    if matches_step(arena, parent, prev_step) {
                        found = Some(parent);
                        break;
                    }
                    cursor = parent_element(arena, parent);
                }
                found
            }
            Combinator::AdjacentSibling => arena
                .previous_element_siblings(current)
                .ok()
                .and_then(|siblings| siblings.first().copied())
                .filter(|&sibling| matches_step(arena, sibling, prev_step)),
            Combinator::GeneralSibling => arena
                .previous_element_siblings(current)
                .ok()
                .and_then(|siblings| {
                    siblings
                        .into_iter()
                        .find(|&sibling| matches_step(arena, sibling, prev_step))
                }),
        };

        let Some(matched) = matched else {
            return false;
        };
        current = matched;
    }

    true
}

fn parent_element(arena: &DomArena, node_id: NodeId) -> Option<NodeId> {
    arena
        .parent(node_id)
        .ok()
        .flatten()
        .filter(|&parent| arena.element(parent).is_ok())
}

fn has_class(element: &DomNode, class_name: &str) -> bool {
    element
        .attr("class")
        .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
}

fn matches_step(arena: &DomArena, node_id: NodeId, step: &Step) -> bool {
    let Ok(element) = arena.element(node_id) else {
        return false;
    };

    if let Some(tag) = &step.tag {
        if !element.node_name.eq_ignore_ascii_case(tag) {
            return false;
        }
    }

    if let Some(id) = &step.id {
        if element.attr("id") != Some(id.as_str()) {
            return false;
        }
    }

    if step.classes.iter().any(|class| !has_class(element, class)) {
        return false;
    }

    for cond in &step.attrs {
        let matched = match cond {
            AttrCondition::Exists { key } => element.attr(key).is_some(),
            AttrCondition::Eq { key, value } => element.attr(key) == Some(value.as_str()),
            AttrCondition::StartsWith { key, value } => element
                .attr(key)
                .is_some_and(|attr| !value.is_empty() && attr.starts_with(value.as_str())),
            AttrCondition::EndsWith { key, value } => element
                .attr(key)
                .is_some_and(|attr| !value.is_empty() && attr.ends_with(value.as_str())),
            AttrCondition::Contains { key, value } => element
                .attr(key)
                .is_some_and(|attr| !value.is_empty() && attr.contains(value.as_str())),
            AttrCondition::Includes { key, value } => element
                .attr(key)
                .is_some_and(|attr| attr.split_ascii_whitespace().any(|token| token == value)),
            AttrCondition::DashMatch { key, value } => element
                .attr(key)
                .is_some_and(|attr| attr == value || attr.starts_with(&format!("{value}-"))),
        };
        if !matched {
            return false;
        }
    }

    for pseudo in &step.pseudo_classes {
        let matched = match pseudo {
            PseudoClass::FirstChild => matches!(sibling_position(arena, node_id), Some((0, _))),
            PseudoClass::LastChild => {
                matches!(sibling_position(arena, node_id), Some((_, true)))
            }
            PseudoClass::OnlyChild => sibling_position(arena, node_id) == Some((0, true)),
            PseudoClass::Empty => element.children_ids.iter().all(|&child| {
                arena.get(child).is_ok_and(|node| {
                    !node.is_element() && !(node.is_text() && !node.node_value.is_empty())
                })
            }),
            PseudoClass::Not(inner) => !matches_groups(inner, arena, node_id),
        };
        if !matched {
            return false;
        }
    }

    true
}

/// (index among element siblings, is last element sibling)
fn sibling_position(arena: &DomArena, node_id: NodeId) -> Option<(usize, bool)> {
    let parent = arena.parent(node_id).ok().flatten()?;
    let siblings = arena.element_children(parent).ok()?;
    let index = siblings.iter().position(|&id| id == node_id)?;
    Some((index, index + 1 == siblings.len()))
}

fn invalid(selector: &str) -> DomError {
    DomError::InvalidSelector(selector.to_string())
}

fn parse_groups(selector: &str) -> Result<Vec<Vec<Part>>> {
    split_top_level(selector, |ch| ch == ',')?
        .into_iter()
        .map(|group| parse_chain(&group, selector))
        .collect()
}

/// Split on `is_separator` outside brackets, parentheses and quotes
fn split_top_level(selector: &str, is_separator: impl Fn(char) -> bool) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut paren_depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in selector.chars() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '"' | '\'' if bracket_depth > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                bracket_depth = bracket_depth.checked_sub(1).ok_or_else(|| invalid(selector))?;
                current.push(ch);
            }
            '(' => {
                paren_depth += 1;
                current.push(ch);
            }
            ')' => {
                paren_depth = paren_depth.checked_sub(1).ok_or_else(|| invalid(selector))?;
                current.push(ch);
            }
            ch if bracket_depth == 0 && paren_depth == 0 && is_separator(ch) => {
                let trimmed = current.trim();
                if trimmed.is_empty() {
                    return Err(invalid(selector));
                }
                groups.push(trimmed.to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 || paren_depth != 0 || quote.is_some() {
        return Err(invalid(selector));
    }

    let trimmed = current.trim();
    if trimmed.is_empty() {
        return Err(invalid(selector));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

fn tokenize(group: &str, source: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut paren_depth = 0usize;
    let mut quote: Option<char> = None;

    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        if !current.is_empty() {
            tokens.push(std::mem::take(current));
        }
    };

    for ch in group.chars() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '"' | '\'' if bracket_depth > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                bracket_depth = bracket_depth.checked_sub(1).ok_or_else(|| invalid(source))?;
                current.push(ch);
            }
            '(' => {
                paren_depth += 1;
                current.push(ch);
            }
            ')' => {
                paren_depth = paren_depth.checked_sub(1).ok_or_else(|| invalid(source))?;
                current.push(ch);
            }
            '>' | '+' | '~' if bracket_depth == 0 && paren_depth == 0 => {
                flush(&mut current, &mut tokens);
                tokens.push(ch.to_string());
            }
            ch if ch.is_ascii_whitespace() && bracket_depth == 0 && paren_depth == 0 => {
                flush(&mut current, &mut tokens);
            }
            _ => current.push(ch),
        }
    }
    flush(&mut current, &mut tokens);

    Ok(tokens)
}

fn parse_chain(group: &str, source: &str) -> Result<Vec<Part>> {
    let mut parts: Vec<Part> = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize(group, source)? {
        let combinator = match token.as_str() {
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::AdjacentSibling),
            "~" => Some(Combinator::GeneralSibling),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if pending.is_some() || parts.is_empty() {
                return Err(invalid(source));
            }
            pending = Some(combinator);
            continue;
        }

        let step = parse_step(&token, source)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(Part { step, combinator });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(invalid(source));
    }
    Ok(parts)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

/// Read an identifier starting at byte `start`, returns it and the next index
fn parse_ident(part: &str, start: usize) -> Option<(String, usize)> {
    let tail = part.get(start..)?;
    let len: usize = tail
        .chars()
        .take_while(|&ch| is_ident_char(ch))
        .map(char::len_utf8)
        .sum();
    if len == 0 {
        return None;
    }
    Some((tail[..len].to_string(), start + len))
}

fn parse_step(part: &str, source: &str) -> Result<Step> {
    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut step = Step::default();

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if step.universal || !step.is_empty() {
                    return Err(invalid(source));
                }
                step.universal = true;
                i += 1;
            }
            b'#' => {
                let (id, next) = parse_ident(part, i + 1).ok_or_else(|| invalid(source))?;
                if step.id.replace(id).is_some() {
                    return Err(invalid(source));
                }
                i = next;
            }
            b'.' => {
                let (class, next) = parse_ident(part, i + 1).ok_or_else(|| invalid(source))?;
                step.classes.push(class);
                i = next;
            }
            b'[' => {
                let (cond, next) = parse_attr_condition(part, i, source)?;
                step.attrs.push(cond);
                i = next;
            }
            b':' => {
                let (pseudo, next) = parse_pseudo(part, i, source)?;
                step.pseudo_classes.push(pseudo);
                i = next;
            }
            _ => {
                if !step.is_empty() {
                    return Err(invalid(source));
                }
                let (tag, next) = parse_ident(part, i).ok_or_else(|| invalid(source))?;
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    if step.is_empty() {
        return Err(invalid(source));
    }
    Ok(step)
}

fn parse_attr_condition(part: &str, start: usize, source: &str) -> Result<(AttrCondition, usize)> {
    let close = find_closing_bracket(part, start).ok_or_else(|| invalid(source))?;
    let body = part[start + 1..close].trim();

    let operators = ["^=", "$=", "*=", "~=", "|=", "="];
    let split = operators
        .iter()
        .filter_map(|op| body.find(op).map(|pos| (pos, *op)))
        .min_by_key(|(pos, op)| (*pos, std::cmp::Reverse(op.len())));

    let cond = match split {
        None => {
            let (key, end) = parse_ident(body, 0).ok_or_else(|| invalid(source))?;
            if end != body.len() {
                return Err(invalid(source));
            }
            AttrCondition::Exists { key }
        }
        Some((pos, op)) => {
            let key = body[..pos].trim().to_string();
            if key.is_empty() || !key.chars().all(is_ident_char) {
                return Err(invalid(source));
            }
            let value = unquote(body[pos + op.len()..].trim()).ok_or_else(|| invalid(source))?;
            match op {
                "^=" => AttrCondition::StartsWith { key, value },
                "$=" => AttrCondition::EndsWith { key, value },
                "*=" => AttrCondition::Contains { key, value },
                "~=" => AttrCondition::Includes { key, value },
                "|=" => AttrCondition::DashMatch { key, value },
                _ => AttrCondition::Eq { key, value },
            }
        }
    };

    Ok((cond, close + 1))
}

fn find_closing_bracket(part: &str, start: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, ch) in part[start..].char_indices() {
        match (quote, ch) {
            (Some(q), ch) if ch == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, ']') => return Some(start + offset),
            _ => {}
        }
    }
    None
}

fn unquote(raw: &str) -> Option<String> {
    let first = raw.chars().next()?;
    if first == '"' || first == '\'' {
        let inner = raw.strip_prefix(first)?.strip_suffix(first)?;
        return Some(inner.to_string());
    }
    if raw.chars().all(is_ident_char) {
        Some(raw.to_string())
    } else {
        None
    }
}

fn parse_pseudo(part: &str, start: usize, source: &str) -> Result<(PseudoClass, usize)> {
    let (name, next) = parse_ident(part, start + 1).ok_or_else(|| invalid(source))?;

    let simple = match name.as_str() {
        "first-child" => Some(PseudoClass::FirstChild),
        "last-child" => Some(PseudoClass::LastChild),
        "only-child" => Some(PseudoClass::OnlyChild),
        "empty" => Some(PseudoClass::Empty),
        _ => None,
    };
    if let Some(pseudo) = simple {
        return Ok((pseudo, next));
    }

    if name == "not" && part[next..].starts_with('(') {
        let close = find_closing_paren(part, next).ok_or_else(|| invalid(source))?;
        let inner = parse_groups(&part[next + 1..close])?;
        return Ok((PseudoClass::Not(inner), close + 1));
    }

    Err(invalid(source))
}

fn find_closing_paren(part: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, ch) in part[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::DOCUMENT_ID;

    /// <div id="root" class="box">
    ///   <ul class="menu">
    ///     <li class="item on"><a href="/home">Home</a></li>
    ///     <li class="item"><a href="https://x.org" lang="en-US">X</a></li>
    ///   </ul>
    ///   <p></p>
    /// </div>
    fn fixture() -> (DomArena, Vec<NodeId>) {
        let mut arena = DomArena::new();
        let div = arena.create_element("div");
        let ul = arena.create_element("ul");
        let li1 = arena.create_element("li");
        let a1 = arena.create_element("a");
        let li2 = arena.create_element("li");
        let a2 = arena.create_element("a");
        let p = arena.create_element("p");

        arena.append_child(DOCUMENT_ID, div).unwrap();
        arena.append_child(div, ul).unwrap();
        arena.append_child(ul, li1).unwrap();
        arena.append_child(li1, a1).unwrap();
        arena.append_child(ul, li2).unwrap();
        arena.append_child(li2, a2).unwrap();
        arena.append_child(div, p).unwrap();

        let text = arena.create_text("Home");
        arena.append_child(a1, text).unwrap();

        let set = |arena: &mut DomArena, id: NodeId, key: &str, value: &str| {
            arena.get_mut(id).unwrap().set_attr(key, value);
        };
        set(&mut arena, div, "id", "root");
        set(&mut arena, div, "class", "box");
        set(&mut arena, ul, "class", "menu");
        set(&mut arena, li1, "class", "item on");
        set(&mut arena, li2, "class", "item");
        set(&mut arena, a1, "href", "/home");
        set(&mut arena, a2, "href", "https://x.org");
        set(&mut arena, a2, "lang", "en-US");

        (arena, vec![div, ul, li1, a1, li2, a2, p])
    }

    fn query(arena: &DomArena, selector: &str) -> Vec<NodeId> {
        Selector::parse(selector)
            .unwrap()
            .query_all(arena, DOCUMENT_ID)
            .unwrap()
    }

    #[test]
    fn test_simple_selectors() {
        let (arena, ids) = fixture();
        let [div, ul, li1, a1, li2, a2, p] = ids[..] else {
            unreachable!()
        };

        assert_eq!(query(&arena, "li"), vec![li1, li2]);
        assert_eq!(query(&arena, "#root"), vec![div]);
        assert_eq!(query(&arena, ".item.on"), vec![li1]);
        assert_eq!(query(&arena, "UL.menu"), vec![ul]);
        assert_eq!(query(&arena, "*").len(), 7);
        assert_eq!(query(&arena, "p, a"), vec![a1, a2, p]);
        assert_eq!(query(&arena, "[lang|=en]"), vec![a2]);
        assert_eq!(query(&arena, "a[href^='/']"), vec![a1]);
        assert_eq!(query(&arena, "a[href$=\".org\"]"), vec![a2]);
        assert_eq!(query(&arena, "[class~=on]"), vec![li1]);
        assert_eq!(query(&arena, "[href*=x]"), vec![a2]);
    }

    #[test]
    fn test_combinators() {
        let (arena, ids) = fixture();
        let [_, ul, li1, a1, li2, a2, p] = ids[..] else {
            unreachable!()
        };

        assert_eq!(query(&arena, "#root a"), vec![a1, a2]);
        assert_eq!(query(&arena, "#root > a"), Vec::<NodeId>::new());
        assert_eq!(query(&arena, "div > ul > li"), vec![li1, li2]);
        assert_eq!(query(&arena, "li + li"), vec![li2]);
        assert_eq!(query(&arena, "ul ~ p"), vec![p]);
        assert_eq!(query(&arena, "ul+p"), vec![p]);
        assert_eq!(query(&arena, "li:not(.on) > a"), vec![a2]);
        assert_eq!(query(&arena, ".menu"), vec![ul]);
    }

    #[test]
    fn test_structural_pseudo_classes() {
        let (arena, ids) = fixture();
        let [_, ul, li1, a1, li2, a2, p] = ids[..] else {
            unreachable!()
        };

        assert_eq!(query(&arena, "li:first-child"), vec![li1]);
        assert_eq!(query(&arena, "li:last-child"), vec![li2]);
        assert_eq!(query(&arena, "a:only-child"), vec![a1, a2]);
        assert_eq!(query(&arena, ":empty"), vec![a2, p]);
        assert_eq!(query(&arena, "ul:first-child"), vec![ul]);
    }

    #[test]
    fn test_closest_and_scoped_query() {
        let (arena, ids) = fixture();
        let [div, ul, li1, a1, ..] = ids[..] else {
            unreachable!()
        };

        let li = Selector::parse("li").unwrap();
        assert_eq!(li.closest(&arena, a1).unwrap(), Some(li1));
        assert_eq!(li.closest(&arena, li1).unwrap(), Some(li1));
        assert_eq!(li.closest(&arena, div).unwrap(), None);

        let a = Selector::parse("a").unwrap();
        assert_eq!(a.query_first(&arena, ul).unwrap(), Some(a1));
        assert_eq!(a.query_first(&arena, a1).unwrap(), None);
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "  ", "div,", "> a", "a >", "a[", "a]", "#", ".", ":hover", "a[x=y z]", "**"] {
            assert!(
                matches!(Selector::parse(bad), Err(DomError::InvalidSelector(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }
}
