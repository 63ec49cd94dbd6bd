use thiserror::Error;

use crate::document::ParseError;
use crate::layout::AlignmentError;

/// Unified result type for the skin engine.
pub type Result<T> = std::result::Result<T, SkinError>;

/// Errors surfaced by the skin engine.
#[derive(Debug, Error)]
pub enum SkinError {
    #[error("document parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("element `{0}` not found")]
    ElementNotFound(String),
    #[error("{0}")]
    Alignment(#[from] AlignmentError),
    #[error("render backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
