//! Selection model - text range endpoints supplied by the platform

use crate::{global_offset_of, DocumentTree, NodeId, ParagraphOffsets, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A position in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// The node containing this position
    pub node_id: NodeId,
    /// Char offset within a text leaf, or child index within an element
    pub offset: usize,
}

impl Position {
    /// Create a new position
    pub fn new(node_id: NodeId, offset: usize) -> Self {
        Self { node_id, offset }
    }

    /// Create a position at the start of a node
    pub fn start_of(node_id: NodeId) -> Self {
        Self { node_id, offset: 0 }
    }

    /// Global character offset of this position
    pub fn global_offset(&self, tree: &DocumentTree, offsets: &ParagraphOffsets) -> Result<usize> {
        global_offset_of(tree, offsets, self.node_id, self.offset)
    }
}

/// A selection in the document
///
/// A selection has an anchor (where the selection started) and a focus
/// (where the selection ends). Either may come first in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Where the selection started
    pub anchor: Position,
    /// Where the selection ends
    pub focus: Position,
}

impl Selection {
    /// Create a new selection
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// Create a collapsed selection (caret only)
    pub fn collapsed(position: Position) -> Self {
        Self {
            anchor: position,
            focus: position,
        }
    }

    /// Check if this selection is collapsed on the same node and offset
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Half-open global range covered by the selection, in document order
    pub fn global_range(&self, tree: &DocumentTree, offsets: &ParagraphOffsets) -> Result<Range<usize>> {
        let anchor = self.anchor.global_offset(tree, offsets)?;
        let focus = self.focus.global_offset(tree, offsets)?;
        Ok(anchor.min(focus)..anchor.max(focus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_selection_is_ordered() {
        let tree = DocumentTree::from_paragraphs(&["Hello world", "Goodbye"]).unwrap();
        let offsets = ParagraphOffsets::compute(&tree);
        let first = tree.text_leaves(offsets.paragraphs()[0])[0];
        let second = tree.text_leaves(offsets.paragraphs()[1])[0];

        let selection = Selection::new(Position::new(second, 4), Position::new(first, 8));

        assert_eq!(selection.global_range(&tree, &offsets).unwrap(), 8..15);
    }

    #[test]
    fn test_collapsed_selection_is_empty() {
        let tree = DocumentTree::from_paragraphs(&["Hello"]).unwrap();
        let offsets = ParagraphOffsets::compute(&tree);
        let leaf = tree.text_leaves(offsets.paragraphs()[0])[0];

        let selection = Selection::collapsed(Position::new(leaf, 2));

        assert!(selection.is_collapsed());
        assert!(selection.global_range(&tree, &offsets).unwrap().is_empty());
    }
}
