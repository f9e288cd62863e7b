//! Error types for the annotation engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    #[error("Malformed host message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
