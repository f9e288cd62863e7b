//! Document Model - Reflowable document tree for positional annotations
//!
//! This crate provides the document tree the annotation engine operates on:
//! an arena of paragraphs, inline elements, text leaves and markup wrappers
//! addressed by stable node IDs, together with the paragraph offset index and
//! the node locator that translate between global character offsets and
//! positions inside text leaves.

mod annotation;
mod document;
mod error;
mod locator;
mod node;
mod node_id;
mod offsets;
mod selection;
mod tree;

pub use annotation::*;
pub use document::*;
pub use error::*;
pub use locator::*;
pub use node::*;
pub use node_id::*;
pub use offsets::*;
pub use selection::*;
pub use tree::*;
