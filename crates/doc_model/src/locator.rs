//! Node locator: local character offset to text leaf

use crate::{DocumentTree, NodeId, ParagraphOffsets};

/// Which side of a leaf boundary an offset should resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Range start: the hit leaf must still contain the target character,
    /// so an offset on a boundary resolves to the start of the next leaf
    Start,
    /// Range end: an offset on a boundary resolves to the right edge of the
    /// previous leaf
    End,
}

/// A text leaf and an offset inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedPoint {
    pub leaf: NodeId,
    pub offset: usize,
}

impl LocatedPoint {
    pub fn new(leaf: NodeId, offset: usize) -> Self {
        Self { leaf, offset }
    }
}

/// Find the text leaf holding `offset` chars into `container`.
///
/// Returns `None` when the offset lies beyond the container's text, which
/// callers treat as "this range does not touch this container".
pub fn locate(
    tree: &DocumentTree,
    container: NodeId,
    offset: usize,
    bias: Bias,
) -> Option<LocatedPoint> {
    let mut consumed = 0;
    for leaf in tree.text_leaves(container) {
        let len = tree.text(leaf).map(|t| t.chars().count()).unwrap_or(0);
        let hit = match bias {
            Bias::Start => consumed + len > offset,
            Bias::End => consumed + len >= offset,
        };
        if hit {
            return Some(LocatedPoint::new(leaf, offset - consumed));
        }
        consumed += len;
    }
    None
}

/// Resolve a global offset to its paragraph and leaf.
///
/// With `Bias::Start` the offset must address a character; with `Bias::End`
/// it may also sit at the end of a paragraph (or of the document).
pub fn locate_global(
    tree: &DocumentTree,
    offsets: &ParagraphOffsets,
    global: usize,
    bias: Bias,
) -> Option<(NodeId, LocatedPoint)> {
    let (index, local) = match bias {
        Bias::Start => offsets.paragraph_at(global)?,
        Bias::End if global == 0 => {
            let index = (0..offsets.len()).find(|&i| !tree.text_leaves(offsets.paragraphs()[i]).is_empty())?;
            (index, 0)
        }
        Bias::End => {
            let (index, local) = offsets.paragraph_at(global - 1)?;
            (index, local + 1)
        }
    };
    let paragraph = offsets.paragraphs()[index];
    locate(tree, paragraph, local, bias).map(|point| (paragraph, point))
}
