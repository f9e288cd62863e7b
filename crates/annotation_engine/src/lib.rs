//! Annotation Engine - Positional text annotations over a document tree
//!
//! This crate turns host annotation records (a kind, a color and a global
//! character range) into markup runs spliced into a [`doc_model::DocumentTree`],
//! tracks which runs belong to which annotation, and drives selection,
//! deletion, restyling and creation as two-phase round trips with the host.

mod bridge;
mod config;
mod engine;
mod error;
mod port;
mod record;
mod registry;
mod selection;
mod splicer;

pub use bridge::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use port::*;
pub use record::*;
pub use registry::*;
pub use selection::*;
pub use splicer::*;
