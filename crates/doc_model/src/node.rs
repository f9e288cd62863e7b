//! Core node types

use crate::{AnnotationId, NodeId};
use serde::{Deserialize, Serialize};

/// Enumeration of all node types in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Root,
    Block,
    Paragraph,
    Inline,
    Text,
    Markup,
}

/// Structural role of a markup node.
///
/// Highlight runs are a single wrapper. Decoration runs (underline, strikeout,
/// squiggly) are an outer wrapper whose only child is an inner wrapper that
/// holds the annotated content and restores the text color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkupShape {
    Highlight,
    Decorated { inner: NodeId },
    DecorationInner,
}

/// A wrapper rendering one contiguous run of one annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Markup {
    /// The annotation this run belongs to
    pub annotation_id: AnnotationId,
    /// Highlight or decoration shape
    pub shape: MarkupShape,
    /// Rendered inline style declarations
    pub style: String,
    /// Visual marker classes (selection state)
    #[serde(default)]
    pub classes: Vec<String>,
}

impl Markup {
    /// Create a markup value with no marker classes
    pub fn new(annotation_id: AnnotationId, shape: MarkupShape, style: impl Into<String>) -> Self {
        Self {
            annotation_id,
            shape,
            style: style.into(),
            classes: Vec::new(),
        }
    }

    /// The inner wrapper of a decoration run, if any
    pub fn inner(&self) -> Option<NodeId> {
        match self.shape {
            MarkupShape::Decorated { inner } => Some(inner),
            _ => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a marker class; returns false if it was already present
    pub fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_string());
        true
    }

    /// Remove a marker class; returns false if it was not present
    pub fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        before != self.classes.len()
    }
}

/// Payload of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// The document root
    Root,
    /// A block container outside paragraph flow (section, div)
    Block,
    /// A paragraph block; the unit of the offset index
    Paragraph,
    /// A structural inline element such as `em` or `a`
    Inline { tag: String },
    /// A text leaf
    Text(String),
    /// An annotation wrapper
    Markup(Markup),
}

/// A node stored in the document arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// What this node is
    pub kind: NodeKind,
}

impl Node {
    /// Create a detached node
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Root => NodeType::Root,
            NodeKind::Block => NodeType::Block,
            NodeKind::Paragraph => NodeType::Paragraph,
            NodeKind::Inline { .. } => NodeType::Inline,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Markup(_) => NodeType::Markup,
        }
    }

    /// Check if this node can have children
    pub fn can_have_children(&self) -> bool {
        !matches!(self.kind, NodeKind::Text(_))
    }

    /// The text of a text leaf
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn markup(&self) -> Option<&Markup> {
        match &self.kind {
            NodeKind::Markup(markup) => Some(markup),
            _ => None,
        }
    }

    pub fn markup_mut(&mut self) -> Option<&mut Markup> {
        match &mut self.kind {
            NodeKind::Markup(markup) => Some(markup),
            _ => None,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}
