//! Small free-standing helpers

use crate::error::Result;
use crate::wrapper::{Selection, Wrapper};
use dom::{Document, Event};
use std::fmt::Display;

/// `value` unless it is absent; present-but-falsy values are kept
pub fn or<T>(value: Option<T>, fallback: T) -> T {
    value.unwrap_or(fallback)
}

/// Left-pad with `'0'` to `width` characters
pub fn pad(n: impl Display, width: usize) -> String {
    pad_with(n, width, '0')
}

/// Left-pad with `fill` to `width` characters; longer input is kept whole
pub fn pad_with(n: impl Display, width: usize, fill: char) -> String {
    let text = n.to_string();
    let missing = width.saturating_sub(text.chars().count());
    let mut padded = String::with_capacity(text.len() + missing * fill.len_utf8());
    padded.extend(std::iter::repeat(fill).take(missing));
    padded.push_str(&text);
    padded
}

/// Format a duration in seconds as `MM:SS`, or `HH:MM:SS` past an hour
///
/// Negative and NaN input read as zero; fractions are floored.
pub fn parse_time(total_seconds: impl Into<f64>) -> String {
    let total = total_seconds.into();
    let total = if total > 0.0 { total } else { 0.0 };

    let hours = (total / 3600.0).floor();
    let minutes = ((total - hours * 3600.0) / 60.0).floor();
    let seconds = (total - hours * 3600.0 - minutes * 60.0).floor();

    let clock = format!("{}:{}", pad(minutes as u64, 2), pad(seconds as u64, 2));
    if hours > 0.0 {
        format!("{}:{}", pad(hours as u64, 2), clock)
    } else {
        clock
    }
}

/// Wrap a selector, node or node list
pub fn node(document: &Document, selection: impl Into<Selection>) -> Wrapper {
    Wrapper::new(document, selection)
}

/// Run `callback` when the document's window fires `load`
pub fn ready<F>(document: &Document, callback: F) -> Result<()>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    node(document, document.window()).listen("load", callback)?;
    Ok(())
}
