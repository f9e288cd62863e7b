//! Inline style strings for annotation markup
//!
//! A highlight is one wrapper with a background color. The decoration kinds
//! color the outer wrapper so the line picks up the annotation color, and an
//! inner wrapper puts the text color back.

use crate::Rgb;
use doc_model::AnnotationKind;

/// CSS `text-decoration` line for a decoration kind
pub fn decoration_line(kind: AnnotationKind) -> Option<&'static str> {
    match kind {
        AnnotationKind::Highlight => None,
        AnnotationKind::Underline => Some("underline"),
        AnnotationKind::Strikeout => Some("line-through"),
        AnnotationKind::Squiggly => Some("underline wavy"),
    }
}

/// Style strings for the wrappers of one annotation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupStyle {
    /// Style of the outer (or only) wrapper
    pub outer: String,
    /// Style of the inner wrapper, for decoration kinds
    pub inner: Option<String>,
}

impl MarkupStyle {
    /// Compute the style strings for an annotation
    pub fn for_annotation(kind: AnnotationKind, color: Rgb, opacity: f32, text_color: &str) -> Self {
        let rgba = color.to_css_rgba(opacity);
        match decoration_line(kind) {
            None => Self {
                outer: format!("background-color: {}", rgba),
                inner: None,
            },
            Some(line) => Self {
                outer: format!("text-decoration: {}; color: {}", line, rgba),
                inner: Some(inner_style(text_color)),
            },
        }
    }
}

/// Style of the color-preserving inner wrapper
pub fn inner_style(text_color: &str) -> String {
    format!("color: {}", text_color)
}
