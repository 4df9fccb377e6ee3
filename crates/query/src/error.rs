//! Error types for wrapper operations

use dom::DomError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Dom(#[from] DomError),

    /// A first-element operation ran on a selection that resolved to nothing
    #[error("No element matches {0}")]
    EmptySelection(String),
}
