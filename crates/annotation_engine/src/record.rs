//! Annotation records
//!
//! The host sends and receives annotations as [`WireAnnotation`] values:
//! a type given as a kind name or a numeric code, a bare hex color and a flat `ranges` array whose
//! first and last elements are the inclusive global start and end offsets.
//! Inside the engine they become [`AnnotationRecord`]s with a validated kind
//! and color and a half-open range.

use doc_model::{AnnotationId, AnnotationKind};
use render_model::{clamp_opacity, MarkupStyle, Rgb};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

fn default_opacity() -> f32 {
    1.0
}

/// Annotation type as sent by the host.
///
/// Hosts name the kind (`"Highlight"`) or send its numeric code (`8`).
/// Anything else still deserializes so one bad record cannot fail a batch;
/// it is rejected later by [`AnnotationRecord::from_wire`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireKind {
    Name(String),
    Code(i64),
    Other(serde_json::Value),
}

impl WireKind {
    pub fn kind(&self) -> Option<AnnotationKind> {
        match self {
            WireKind::Name(name) => name.parse().ok(),
            WireKind::Code(code) => AnnotationKind::from_code(*code),
            WireKind::Other(_) => None,
        }
    }
}

impl Default for WireKind {
    fn default() -> Self {
        WireKind::Other(serde_json::Value::Null)
    }
}

impl std::fmt::Display for WireKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireKind::Name(name) => f.write_str(name),
            WireKind::Code(code) => write!(f, "{}", code),
            WireKind::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for WireKind {
    fn from(name: &str) -> Self {
        WireKind::Name(name.to_string())
    }
}

impl From<AnnotationKind> for WireKind {
    fn from(kind: AnnotationKind) -> Self {
        WireKind::Name(kind.as_str().to_string())
    }
}

/// Annotation as exchanged with the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireAnnotation {
    /// Host-allocated id; absent on create proposals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AnnotationId>,
    #[serde(rename = "type", default)]
    pub kind: WireKind,
    /// Six hex digits, no leading marker
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Inclusive global offsets; only the first and last entries are used
    #[serde(default)]
    pub ranges: Vec<usize>,
}

/// Reasons a wire annotation is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("annotation has no id")]
    MissingId,

    #[error("unknown annotation type {0:?}")]
    UnknownKind(String),

    #[error("invalid color {0:?}")]
    InvalidColor(String),

    #[error("annotation has no range")]
    MissingRange,
}

/// Visual style of an annotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationStyle {
    pub kind: AnnotationKind,
    pub color: Rgb,
    /// Always within `[0, 1]`
    pub opacity: f32,
}

impl AnnotationStyle {
    pub fn new(kind: AnnotationKind, color: Rgb, opacity: f32) -> Self {
        Self {
            kind,
            color,
            opacity: clamp_opacity(opacity),
        }
    }

    /// Style strings for markup rendering this annotation
    pub fn markup_style(&self, text_color: &str) -> MarkupStyle {
        MarkupStyle::for_annotation(self.kind, self.color, self.opacity, text_color)
    }

    /// Wire form without an id, as sent with a create request
    pub fn proposal(&self, range: &Range<usize>) -> WireAnnotation {
        WireAnnotation {
            id: None,
            kind: self.kind.into(),
            color: self.color.to_hex(),
            opacity: self.opacity,
            ranges: vec![range.start, range.end.saturating_sub(1)],
        }
    }
}

/// A validated annotation
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub id: AnnotationId,
    pub style: AnnotationStyle,
    /// Half-open global character range
    pub range: Range<usize>,
}

impl AnnotationRecord {
    pub fn new(id: AnnotationId, style: AnnotationStyle, range: Range<usize>) -> Self {
        Self { id, style, range }
    }

    /// Validate a wire annotation.
    ///
    /// The inclusive `[first, last]` range becomes `first..last + 1`; a
    /// reversed range comes out empty rather than failing.
    pub fn from_wire(wire: &WireAnnotation) -> Result<Self, RecordError> {
        let id = wire.id.clone().ok_or(RecordError::MissingId)?;
        let kind = wire
            .kind
            .kind()
            .ok_or_else(|| RecordError::UnknownKind(wire.kind.to_string()))?;
        let color =
            Rgb::from_hex(&wire.color).map_err(|_| RecordError::InvalidColor(wire.color.clone()))?;
        let (Some(&first), Some(&last)) = (wire.ranges.first(), wire.ranges.last()) else {
            return Err(RecordError::MissingRange);
        };
        let end = last.saturating_add(1).max(first);

        Ok(Self {
            id,
            style: AnnotationStyle::new(kind, color, wire.opacity),
            range: first..end,
        })
    }

    /// Wire form with id and inclusive range
    pub fn to_wire(&self) -> WireAnnotation {
        WireAnnotation {
            id: Some(self.id.clone()),
            ..self.style.proposal(&self.range)
        }
    }
}
