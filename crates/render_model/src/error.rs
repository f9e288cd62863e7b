//! Error types for render model

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("Invalid color: {0:?} (expected six hex digits)")]
    InvalidColor(String),

    #[error("Render failed: {0}")]
    RenderFailed(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
