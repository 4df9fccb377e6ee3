//! Inline style and class list handling
//!
//! Both live in plain attributes (`style`, `class`); these helpers parse the
//! attribute, apply an edit and hand back the new attribute value.

use smallvec::SmallVec;

/// Normalize a style property name to its CSS form
///
/// `fontSize` → `font-size`, `cssFloat` → `float`. Custom properties
/// (`--x`) are case-sensitive and kept as-is.
pub fn normalize_property(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        return name.to_string();
    }
    if name == "cssFloat" {
        return "float".to_string();
    }

    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Parsed `style` attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    properties: SmallVec<[(String, String); 4]>,
}

impl InlineStyle {
    /// Parse a `style` attribute value
    ///
    /// Declarations without a colon are dropped; a repeated property keeps
    /// its first position and its last value.
    pub fn parse(attr: &str) -> Self {
        let mut style = Self::default();
        for declaration in split_declarations(attr) {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            let name = normalize_property(name);
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }
            style.set(&name, value);
        }
        style
    }

    /// Property value, empty string when unset
    pub fn get(&self, name: &str) -> &str {
        let name = normalize_property(name);
        self.properties
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// Set a property; an empty value removes it
    pub fn set(&mut self, name: &str, value: &str) {
        let name = normalize_property(name);
        let value = value.trim();
        if value.is_empty() {
            self.properties.retain(|(key, _)| *key != name);
            return;
        }
        match self.properties.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.properties.push((name, value.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Serialize back to attribute form, `None` when no property is left
    pub fn to_attr(&self) -> Option<String> {
        if self.properties.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .properties
            .iter()
            .map(|(key, value)| format!("{key}: {value};"))
            .collect();
        Some(parts.join(" "))
    }
}

/// Split on `;` outside quotes and parentheses (`url(a;b)` stays whole)
fn split_declarations(attr: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;

    for (idx, ch) in attr.char_indices() {
        match (quote, ch) {
            (Some(q), ch) if ch == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                out.push(&attr[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    out.push(&attr[start..]);
    out
}

/// Whether a `class` attribute value contains `name`
pub fn class_contains(attr: Option<&str>, name: &str) -> bool {
    attr.is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == name))
}

/// New `class` value with `name` added, `None` if already present
pub fn class_add(attr: Option<&str>, name: &str) -> Option<String> {
    if class_contains(attr, name) {
        return None;
    }
    let mut classes: Vec<&str> = attr
        .map(|a| a.split_ascii_whitespace().collect())
        .unwrap_or_default();
    classes.push(name);
    Some(classes.join(" "))
}

/// New `class` value with `name` removed, `None` if it was absent
pub fn class_remove(attr: Option<&str>, name: &str) -> Option<String> {
    if !class_contains(attr, name) {
        return None;
    }
    let classes: Vec<&str> = attr
        .map(|a| a.split_ascii_whitespace().filter(|c| *c != name).collect())
        .unwrap_or_default();
    Some(classes.join(" "))
}
