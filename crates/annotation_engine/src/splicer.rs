//! Range splicer
//!
//! Wraps a character range of one paragraph in markup without disturbing the
//! paragraph's existing structure. The boundary text leaves are split so the
//! range starts and ends on leaf edges; then every maximal run of siblings
//! inside the range is wrapped in its own markup node. A range crossing
//! inline elements therefore produces several runs, all carrying the same
//! annotation id.
//!
//! For leaves `first` and `last` with common ancestor `A`, the runs are:
//! on the left, from `first` up to the child of `A` containing it, everything
//! after the path at each level; in the middle, the children of `A` strictly
//! between the two paths; on the right, mirrored, everything before the path.

use doc_model::{
    locate, AnnotationId, Bias, DocModelError, DocumentTree, Markup, MarkupShape, NodeId,
    NodeKind, Result,
};
use render_model::MarkupStyle;
use std::ops::Range;
use tracing::debug;

/// Blueprint for the markup nodes of one annotation
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupTemplate {
    pub annotation_id: AnnotationId,
    pub style: MarkupStyle,
}

impl MarkupTemplate {
    pub fn new(annotation_id: AnnotationId, style: MarkupStyle) -> Self {
        Self {
            annotation_id,
            style,
        }
    }

    /// Create a detached markup run.
    ///
    /// Highlights are a single node. Decorations are an outer node holding an
    /// inner node; both carry the annotation id and the outer one is returned.
    pub fn instantiate(&self, tree: &mut DocumentTree) -> Result<NodeId> {
        let Some(inner_style) = &self.style.inner else {
            return Ok(tree.create_node(NodeKind::Markup(Markup::new(
                self.annotation_id.clone(),
                MarkupShape::Highlight,
                self.style.outer.clone(),
            ))));
        };

        let inner = tree.create_node(NodeKind::Markup(Markup::new(
            self.annotation_id.clone(),
            MarkupShape::DecorationInner,
            inner_style.clone(),
        )));
        let outer = tree.create_node(NodeKind::Markup(Markup::new(
            self.annotation_id.clone(),
            MarkupShape::Decorated { inner },
            self.style.outer.clone(),
        )));
        tree.append_child(outer, inner)?;
        Ok(outer)
    }
}

/// Rewrite the style of an existing run.
///
/// The inner style is only touched when the run actually has an inner node.
pub fn apply_style(tree: &mut DocumentTree, run: NodeId, style: &MarkupStyle) -> Result<()> {
    let markup = tree
        .markup_mut(run)
        .ok_or_else(|| DocModelError::InvalidOperation(format!("{} is not markup", run)))?;
    markup.style = style.outer.clone();
    let inner = markup.inner();

    if let (Some(inner), Some(inner_style)) = (inner, &style.inner) {
        if let Some(markup) = tree.markup_mut(inner) {
            markup.style = inner_style.clone();
        }
    }
    Ok(())
}

/// Splices markup for one annotation into a document tree
pub struct RangeSplicer<'a> {
    tree: &'a mut DocumentTree,
    template: &'a MarkupTemplate,
}

impl<'a> RangeSplicer<'a> {
    pub fn new(tree: &'a mut DocumentTree, template: &'a MarkupTemplate) -> Self {
        Self { tree, template }
    }

    /// Wrap the local char range `range` of `paragraph`.
    ///
    /// Returns the created runs in document order. An empty range, or one
    /// that does not reach any text, creates nothing.
    pub fn splice_local(&mut self, paragraph: NodeId, range: Range<usize>) -> Result<Vec<NodeId>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let start = locate(self.tree, paragraph, range.start, Bias::Start);
        let end = locate(self.tree, paragraph, range.end, Bias::End);
        let (Some(start), Some(end)) = (start, end) else {
            debug!(
                paragraph = %paragraph,
                start = range.start,
                end = range.end,
                "range does not resolve inside paragraph"
            );
            return Ok(Vec::new());
        };

        let (first, last) = if start.leaf == end.leaf {
            if start.offset >= end.offset {
                return Ok(Vec::new());
            }
            self.keep_head(end.leaf, end.offset)?;
            let first = self.split_off_tail(start.leaf, start.offset)?;
            (first, first)
        } else {
            let first = self.split_off_tail(start.leaf, start.offset)?;
            let last = self.keep_head(end.leaf, end.offset)?;
            (first, last)
        };

        self.wrap_between(first, last)
    }

    /// Wrap all of a paragraph's content in a single run
    pub fn wrap_paragraph(&mut self, paragraph: NodeId) -> Result<Vec<NodeId>> {
        let (Some(first), Some(last)) = (
            self.tree.first_child(paragraph),
            self.tree.last_child(paragraph),
        ) else {
            return Ok(Vec::new());
        };
        Ok(self.wrap_run(paragraph, first, last)?.into_iter().collect())
    }

    /// Leaf holding the text from `offset` on; splits off the head if needed
    fn split_off_tail(&mut self, leaf: NodeId, offset: usize) -> Result<NodeId> {
        if offset == 0 {
            return Ok(leaf);
        }
        let (_, right) = self.tree.split_text_leaf(leaf, offset)?;
        Ok(right)
    }

    /// Keep only the first `offset` chars in `leaf`, moving the rest after it
    fn keep_head(&mut self, leaf: NodeId, offset: usize) -> Result<NodeId> {
        if offset < self.tree.text_len(leaf) {
            self.tree.split_text_leaf(leaf, offset)?;
        }
        Ok(leaf)
    }

    /// Wrap everything from leaf `first` to leaf `last`, inclusive
    fn wrap_between(&mut self, first: NodeId, last: NodeId) -> Result<Vec<NodeId>> {
        let parent_of = |tree: &DocumentTree, id: NodeId| {
            tree.parent(id)
                .ok_or(DocModelError::Detached(id.as_uuid()))
        };

        if first == last {
            let parent = parent_of(self.tree, first)?;
            return Ok(self.wrap_run(parent, first, last)?.into_iter().collect());
        }

        let ancestor = self.tree.common_ancestor(first, last).ok_or_else(|| {
            DocModelError::TreeStructureError(format!("{} and {} share no ancestor", first, last))
        })?;

        let mut runs: Vec<(NodeId, NodeId, NodeId)> = Vec::new();

        // Left side, bottom-up
        let mut node = first;
        let mut from_self = true;
        loop {
            let parent = parent_of(self.tree, node)?;
            if parent == ancestor {
                break;
            }
            let from = if from_self {
                Some(node)
            } else {
                self.tree.next_sibling(node)
            };
            if let (Some(from), Some(to)) = (from, self.tree.last_child(parent)) {
                runs.push((parent, from, to));
            }
            node = parent;
            from_self = false;
        }
        let middle_from = if from_self {
            Some(node)
        } else {
            self.tree.next_sibling(node)
        };

        // Right side, collected bottom-up and emitted top-down
        let mut right: Vec<(NodeId, NodeId, NodeId)> = Vec::new();
        let mut node = last;
        let mut to_self = true;
        loop {
            let parent = parent_of(self.tree, node)?;
            if parent == ancestor {
                break;
            }
            let to = if to_self {
                Some(node)
            } else {
                self.tree.previous_sibling(node)
            };
            if let (Some(from), Some(to)) = (self.tree.first_child(parent), to) {
                right.push((parent, from, to));
            }
            node = parent;
            to_self = false;
        }
        let middle_to = if to_self {
            Some(node)
        } else {
            self.tree.previous_sibling(node)
        };

        if let (Some(from), Some(to)) = (middle_from, middle_to) {
            let ordered = matches!(
                (self.tree.index_in_parent(from), self.tree.index_in_parent(to)),
                (Some(a), Some(b)) if a <= b
            );
            if ordered {
                runs.push((ancestor, from, to));
            }
        }
        runs.extend(right.into_iter().rev());

        let mut created = Vec::with_capacity(runs.len());
        for (parent, from, to) in runs {
            if let Some(run) = self.wrap_run(parent, from, to)? {
                created.push(run);
            }
        }
        Ok(created)
    }

    /// Wrap siblings `from..=to` of `parent`; runs without text are skipped
    fn wrap_run(&mut self, parent: NodeId, from: NodeId, to: NodeId) -> Result<Option<NodeId>> {
        let children = self.tree.children(parent);
        let (Some(a), Some(b)) = (
            children.iter().position(|&c| c == from),
            children.iter().position(|&c| c == to),
        ) else {
            return Err(DocModelError::TreeStructureError(format!(
                "run {}..{} is not under {}",
                from, to, parent
            )));
        };
        let text: usize = children[a..=b]
            .iter()
            .map(|&c| self.tree.text_len(c))
            .sum();
        if text == 0 {
            debug!(parent = %parent, "skipping run without text");
            return Ok(None);
        }

        let wrapper = self.template.instantiate(self.tree)?;
        self.tree.wrap_children(parent, from, to, wrapper)?;
        Ok(Some(wrapper))
    }
}
