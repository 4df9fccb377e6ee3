//! Chainable DOM manipulation over a [`dom::Document`]
//!
//! ```text
//! node(&doc, "li.item")      → Wrapper (re-queries on each call)
//!     .add_class("x")?        → applies to every match
//!     .css("color")?          → reads from the first match
//! ```
//!
//! The document is always passed explicitly; there is no ambient window.

pub mod error;
pub mod helper;
pub mod wrapper;

pub use error::{Error, Result};
pub use helper::{node, or, pad, pad_with, parse_time, ready};
pub use wrapper::{Selection, Wrapper, ACTIVE_CLASS, DISPLAY_CACHE_ATTR};

pub use dom::{Document, DocumentConfig, Event, NodeId, Offset};
