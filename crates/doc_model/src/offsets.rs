//! Paragraph offset index
//!
//! Maps the paragraph forest onto one contiguous character-offset space and
//! back. The index is rebuilt from scratch whenever the paragraph set may
//! have changed; markup insertion never changes it because it preserves text.

use crate::{DocModelError, DocumentTree, NodeId, NodeType, Result};
use std::ops::Range;

/// Global start offset of every paragraph, plus the total document length
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParagraphOffsets {
    paragraphs: Vec<NodeId>,
    /// `paragraphs.len() + 1` entries; the last is the document length
    starts: Vec<usize>,
}

/// Compute the `len + 1` offset table for the paragraphs of a tree
pub fn compute_paragraph_offsets(tree: &DocumentTree) -> Vec<usize> {
    ParagraphOffsets::compute(tree).starts
}

impl ParagraphOffsets {
    /// Build the index for the current paragraphs of `tree`
    pub fn compute(tree: &DocumentTree) -> Self {
        let paragraphs = tree.paragraphs();
        let mut starts = Vec::with_capacity(paragraphs.len() + 1);
        let mut total = 0;
        starts.push(0);
        for &para in &paragraphs {
            total += tree.text_len(para);
            starts.push(total);
        }
        Self { paragraphs, starts }
    }

    /// The raw offset table
    pub fn as_slice(&self) -> &[usize] {
        &self.starts
    }

    /// Paragraph IDs, in document order
    pub fn paragraphs(&self) -> &[NodeId] {
        &self.paragraphs
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Total document length in chars
    pub fn total_len(&self) -> usize {
        self.starts.last().copied().unwrap_or(0)
    }

    /// Global start offset of paragraph `index`
    pub fn start_of(&self, index: usize) -> Option<usize> {
        (index < self.paragraphs.len()).then(|| self.starts[index])
    }

    /// Global range covered by paragraph `index`
    pub fn range_of(&self, index: usize) -> Option<Range<usize>> {
        (index < self.paragraphs.len()).then(|| self.starts[index]..self.starts[index + 1])
    }

    pub fn index_of(&self, paragraph: NodeId) -> Option<usize> {
        self.paragraphs.iter().position(|&p| p == paragraph)
    }

    /// Paragraph index and local offset of the character at `global`
    pub fn paragraph_at(&self, global: usize) -> Option<(usize, usize)> {
        if global >= self.total_len() {
            return None;
        }
        // First paragraph whose end lies beyond `global`; skips empty ones
        let index = self.starts[1..].partition_point(|&end| end <= global);
        Some((index, global - self.starts[index]))
    }

    /// Split a half-open global range into per-paragraph local ranges.
    ///
    /// Paragraphs the range does not intersect (including empty paragraphs)
    /// are left out. Ranges are clamped to the document length.
    pub fn split_range(&self, range: Range<usize>) -> Vec<(usize, Range<usize>)> {
        let end = range.end.min(self.total_len());
        if range.start >= end {
            return Vec::new();
        }
        (0..self.paragraphs.len())
            .filter_map(|index| {
                let para = self.starts[index]..self.starts[index + 1];
                let start = range.start.max(para.start);
                let stop = end.min(para.end);
                (start < stop).then(|| (index, start - para.start..stop - para.start))
            })
            .collect()
    }
}

/// Global offset of a point given as a node and a local offset.
///
/// For a text leaf `local` counts chars; for any other node it is a child
/// index, as in a DOM range boundary.
pub fn global_offset_of(
    tree: &DocumentTree,
    offsets: &ParagraphOffsets,
    node: NodeId,
    local: usize,
) -> Result<usize> {
    let mut offset = if tree.is_text(node) {
        if local > tree.text_len(node) {
            return Err(DocModelError::InvalidPosition {
                node_id: node.as_uuid(),
                offset: local,
            });
        }
        local
    } else {
        let children = tree.children(node);
        if local > children.len() {
            return Err(DocModelError::InvalidPosition {
                node_id: node.as_uuid(),
                offset: local,
            });
        }
        children[..local].iter().map(|&c| tree.text_len(c)).sum()
    };

    let mut current = node;
    loop {
        if tree.node_type(current) == Some(NodeType::Paragraph) {
            if let Some(index) = offsets.index_of(current) {
                return Ok(offset + offsets.starts[index]);
            }
        }
        let Some(parent) = tree.parent(current) else {
            break;
        };
        for &sibling in tree.children(parent) {
            if sibling == current {
                break;
            }
            offset += tree.text_len(sibling);
        }
        current = parent;
    }

    if current != tree.root_id() {
        return Err(DocModelError::Detached(node.as_uuid()));
    }
    Ok(offset)
}
