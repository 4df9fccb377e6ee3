//! In-memory DOM
//!
//! A self-contained document model: arena node storage, a CSS selector
//! engine, inline style and class handling, HTML parsing/serialization,
//! event listeners and a mutation feed.
//!
//! ## Core Design
//!
//! ```text
//! HTML / CDP JSON → DomArena (owned, u32 indices) → Document (Arc handle)
//!                                                       ↓
//!                                   selectors, style, events, serializer
//! ```
//!
//! Nothing here is global. Callers hold a `Document` and pass it where it
//! is needed, which is what makes the tree testable without a browser.

pub mod arena;
pub mod document;
pub mod error;
pub mod events;
pub mod parser;
pub mod selector;
pub mod serializer;
pub mod snapshot;
pub mod style;
pub mod types;

pub use arena::DomArena;
pub use document::{Document, DocumentConfig};
pub use error::{DomError, Result};
pub use events::{DomEvent, Event, EventBus, Listener};
pub use selector::Selector;
pub use types::*;
