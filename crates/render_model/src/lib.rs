//! Render Model - Annotation markup styling and HTML output
//!
//! This crate turns annotation colors and kinds into the inline style strings
//! carried by markup nodes, and serializes an annotated document tree to HTML
//! for the host view.

mod color;
mod error;
mod html;
mod style;

pub use color::*;
pub use error::*;
pub use html::*;
pub use style::*;
