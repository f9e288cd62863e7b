//! Annotation identity and kind
//!
//! These types are shared by the tree (markup nodes carry the id of the
//! annotation they render) and by the engine that creates them.

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Host-allocated identifier of an annotation.
///
/// Hosts allocate numeric ids but the engine treats them as opaque strings,
/// so both `"42"` and `42` deserialize to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AnnotationId(String);

impl AnnotationId {
    /// Create an annotation id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AnnotationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for AnnotationId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for AnnotationId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Number(u64),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(s) => Self(s),
            WireId::Number(n) => Self(n.to_string()),
        })
    }
}

/// The visual kind of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    Highlight,
    Underline,
    Strikeout,
    Squiggly,
}

impl AnnotationKind {
    /// All kinds, in wire order
    pub const ALL: [AnnotationKind; 4] = [
        AnnotationKind::Highlight,
        AnnotationKind::Underline,
        AnnotationKind::Strikeout,
        AnnotationKind::Squiggly,
    ];

    /// The name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Highlight => "Highlight",
            AnnotationKind::Underline => "Underline",
            AnnotationKind::Strikeout => "Strikeout",
            AnnotationKind::Squiggly => "Squiggly",
        }
    }

    /// Numeric code used by hosts that send kinds as integers
    pub fn code(&self) -> i64 {
        match self {
            AnnotationKind::Highlight => 8,
            AnnotationKind::Underline => 9,
            AnnotationKind::Squiggly => 10,
            AnnotationKind::Strikeout => 11,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        AnnotationKind::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Whether markup for this kind is a decoration wrapper with an inner
    /// color-preserving wrapper, rather than a single background span
    pub fn is_decoration(&self) -> bool {
        !matches!(self, AnnotationKind::Highlight)
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a wire string names no known annotation kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown annotation kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for AnnotationKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AnnotationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
