//! Document tree storage and the generic ordered-tree interface
//!
//! All nodes live in one arena keyed by [`NodeId`]. Structural edits
//! (splitting text leaves, inserting, wrapping and unwrapping) go through the
//! methods here so parent and child links always agree.

use crate::{AnnotationId, DocModelError, Markup, MarkupShape, Node, NodeId, NodeKind, NodeType, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The complete document tree structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
}

/// Convert a char offset into a byte index, clamping to the end of the string
pub(crate) fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

impl DocumentTree {
    /// Create a tree holding only a root
    pub fn new() -> Self {
        let root = Node::new(NodeKind::Root);
        let root_id = root.id();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self { root: root_id, nodes }
    }

    /// Get the document root ID
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Get a node or fail with `NodeNotFound`
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or(DocModelError::NodeNotFound(id.as_uuid()))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or(DocModelError::NodeNotFound(id.as_uuid()))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes in the arena, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.nodes.get(&id).map(Node::node_type)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(Node::parent)
    }

    /// Children of a node (empty for leaves and unknown IDs)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(Node::children).unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Index of a node within its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Ancestors of a node, nearest first, not including the node itself
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            result.push(node);
            current = self.parent(node);
        }
        result
    }

    /// Check if `ancestor` is a proper ancestor of `node`
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).contains(&ancestor)
    }

    /// Lowest node that is `a`, `b`, or an ancestor of both
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut chain_a = vec![a];
        chain_a.extend(self.ancestors(a));
        std::iter::once(b)
            .chain(self.ancestors(b))
            .find(|candidate| chain_a.contains(candidate))
    }

    /// Pre-order listing of a subtree, including its root
    pub fn preorder(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !self.contains(id) {
                continue;
            }
            result.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        result
    }

    // =========================================================================
    // Construction and structural edits
    // =========================================================================

    /// Create a detached node and return its ID
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let node = Node::new(kind);
        let id = node.id();
        self.nodes.insert(id, node);
        id
    }

    /// Create a detached text leaf
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::Text(text.into()))
    }

    /// Append a node as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `node` into `parent` before `reference` (or at the end).
    ///
    /// A node that is already attached somewhere is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        if !self.node(parent)?.can_have_children() {
            return Err(DocModelError::InvalidOperation(format!(
                "node {} cannot have children",
                parent
            )));
        }
        self.node(node)?;
        if node == self.root || node == parent || self.is_ancestor_of(node, parent) {
            return Err(DocModelError::TreeStructureError(format!(
                "inserting {} under {} would create a cycle",
                node, parent
            )));
        }
        if reference == Some(node) {
            return Ok(());
        }

        self.detach(node)?;

        let index = match reference {
            Some(reference) => self
                .children(parent)
                .iter()
                .position(|&c| c == reference)
                .ok_or_else(|| {
                    DocModelError::TreeStructureError(format!(
                        "reference {} is not a child of {}",
                        reference, parent
                    ))
                })?,
            None => self.children(parent).len(),
        };

        self.node_mut(parent)?.children_mut().insert(index, node);
        self.node_mut(node)?.set_parent(Some(parent));
        Ok(())
    }

    /// Detach a node from its parent, keeping it (and its subtree) in the arena
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        let parent = self.node(node)?.parent();
        if let Some(parent) = parent {
            self.node_mut(parent)?.children_mut().retain(|&c| c != node);
            self.node_mut(node)?.set_parent(None);
        }
        Ok(())
    }

    /// Detach a node and drop its whole subtree
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(DocModelError::InvalidOperation(
                "the root cannot be removed".to_string(),
            ));
        }
        self.detach(node)?;
        for id in self.preorder(node) {
            self.nodes.remove(&id);
        }
        Ok(())
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// Text of a text leaf
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).and_then(Node::text)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    /// Concatenated text of all leaves under `id`, in tree order
    pub fn text_content(&self, id: NodeId) -> String {
        self.preorder(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Length of `text_content(id)` in chars
    pub fn text_len(&self, id: NodeId) -> usize {
        self.preorder(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .map(|t| t.chars().count())
            .sum()
    }

    /// Text leaves under `container`, in tree order
    pub fn text_leaves(&self, container: NodeId) -> Vec<NodeId> {
        self.preorder(container)
            .into_iter()
            .filter(|&n| self.is_text(n))
            .collect()
    }

    /// Split a text leaf at a char offset.
    ///
    /// The original leaf keeps the left part and its ID; the right part is a
    /// new leaf inserted immediately after it. Either part may be empty when
    /// `offset` is at an edge.
    pub fn split_text_leaf(&mut self, leaf: NodeId, offset: usize) -> Result<(NodeId, NodeId)> {
        let text = self
            .text(leaf)
            .ok_or(DocModelError::NotATextLeaf(leaf.as_uuid()))?;
        if offset > text.chars().count() {
            return Err(DocModelError::InvalidPosition {
                node_id: leaf.as_uuid(),
                offset,
            });
        }

        let byte = char_to_byte(text, offset);
        let right_text = text[byte..].to_string();
        if let NodeKind::Text(text) = &mut self.node_mut(leaf)?.kind {
            text.truncate(byte);
        }

        let right = self.create_text(right_text);
        if let Some(parent) = self.parent(leaf) {
            let reference = self.next_sibling(leaf);
            self.insert_before(parent, right, reference)?;
        }
        Ok((leaf, right))
    }

    // =========================================================================
    // Wrappers
    // =========================================================================

    pub fn markup(&self, id: NodeId) -> Option<&Markup> {
        self.nodes.get(&id).and_then(Node::markup)
    }

    pub fn markup_mut(&mut self, id: NodeId) -> Option<&mut Markup> {
        self.nodes.get_mut(&id).and_then(Node::markup_mut)
    }

    /// Turn an inline element into a markup wrapper in place. Its children
    /// and position are kept.
    pub fn convert_to_markup(&mut self, id: NodeId, markup: Markup) -> Result<()> {
        let node = self.node_mut(id)?;
        if !matches!(node.kind, NodeKind::Inline { .. }) {
            return Err(DocModelError::InvalidOperation(format!(
                "{} is not an inline element",
                id
            )));
        }
        node.kind = NodeKind::Markup(markup);
        Ok(())
    }

    /// The node that holds a wrapper's content.
    ///
    /// For a decoration run this is the inner wrapper; for anything else it
    /// is the node itself.
    pub fn content_host(&self, id: NodeId) -> NodeId {
        self.markup(id).and_then(Markup::inner).unwrap_or(id)
    }

    /// Insert a detached `wrapper` into `parent` at the position of `first`
    /// and move the siblings `first..=last` into the wrapper's content host.
    pub fn wrap_children(
        &mut self,
        parent: NodeId,
        first: NodeId,
        last: NodeId,
        wrapper: NodeId,
    ) -> Result<()> {
        if self.node(wrapper)?.parent().is_some() || wrapper == self.root {
            return Err(DocModelError::InvalidOperation(format!(
                "wrapper {} must be detached",
                wrapper
            )));
        }
        let children = self.children(parent);
        let not_child = |id: NodeId| {
            DocModelError::TreeStructureError(format!("{} is not a child of {}", id, parent))
        };
        let start = children
            .iter()
            .position(|&c| c == first)
            .ok_or_else(|| not_child(first))?;
        let end = children
            .iter()
            .position(|&c| c == last)
            .ok_or_else(|| not_child(last))?;
        if start > end {
            return Err(DocModelError::InvalidOperation(format!(
                "{} comes after {}",
                first, last
            )));
        }

        let host = self.content_host(wrapper);
        self.node(host)?;

        let parent_node = self.node_mut(parent)?;
        let moved: Vec<NodeId> = parent_node.children_mut().drain(start..=end).collect();
        parent_node.children_mut().insert(start, wrapper);
        self.node_mut(wrapper)?.set_parent(Some(parent));

        for &child in &moved {
            self.node_mut(child)?.set_parent(Some(host));
        }
        self.node_mut(host)?.children_mut().extend(moved);
        Ok(())
    }

    /// Remove a wrapper, splicing its content host's children into the
    /// wrapper's parent at the wrapper's position. Returns the moved children.
    pub fn unwrap(&mut self, wrapper: NodeId) -> Result<Vec<NodeId>> {
        let parent = self.node(wrapper)?.parent().ok_or_else(|| {
            DocModelError::TreeStructureError(format!("wrapper {} is detached", wrapper))
        })?;
        let index = self
            .index_in_parent(wrapper)
            .ok_or_else(|| DocModelError::TreeStructureError(format!("{} not in parent", wrapper)))?;
        let host = self.content_host(wrapper);

        let moved = std::mem::take(self.node_mut(host)?.children_mut());
        for &child in &moved {
            self.node_mut(child)?.set_parent(Some(parent));
        }
        let siblings = self.node_mut(parent)?.children_mut();
        siblings.remove(index);
        for (i, &child) in moved.iter().enumerate() {
            siblings.insert(index + i, child);
        }
        self.node_mut(wrapper)?.set_parent(None);

        for id in self.preorder(wrapper) {
            self.nodes.remove(&id);
        }
        Ok(moved)
    }

    /// Nearest markup run at or above `id`.
    ///
    /// Hits on a decoration's inner wrapper resolve to the outer wrapper,
    /// which is the node tracked per run.
    pub fn markup_ancestor(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|n| match self.markup(n)?.shape {
                MarkupShape::DecorationInner => self.parent(n),
                _ => Some(n),
            })
    }

    /// All markup runs of one annotation currently attached, in tree order
    pub fn markup_nodes(&self, annotation_id: &AnnotationId) -> Vec<NodeId> {
        self.preorder(self.root)
            .into_iter()
            .filter(|&n| {
                self.markup(n).is_some_and(|m| {
                    &m.annotation_id == annotation_id
                        && !matches!(m.shape, MarkupShape::DecorationInner)
                })
            })
            .collect()
    }

    // =========================================================================
    // Document structure
    // =========================================================================

    /// Paragraph nodes in document order
    pub fn paragraphs(&self) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            match self.node_type(id) {
                Some(NodeType::Paragraph) => result.push(id),
                Some(NodeType::Root) | Some(NodeType::Block) => {
                    stack.extend(self.children(id).iter().rev().copied())
                }
                _ => {}
            }
        }
        result
    }

    /// The paragraph containing a node, if any
    pub fn enclosing_paragraph(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| self.node_type(n) == Some(NodeType::Paragraph))
    }

    /// Whole-document plain text used for offset computation
    pub fn plain_text(&self) -> String {
        self.paragraphs()
            .into_iter()
            .map(|p| self.text_content(p))
            .collect()
    }

    /// Merge adjacent text leaves and drop empty ones under `id`
    pub fn normalize(&mut self, id: NodeId) -> Result<()> {
        let children = self.children(id).to_vec();
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());

        for child in children {
            let Some(text) = self.text(child).map(str::to_string) else {
                self.normalize(child)?;
                kept.push(child);
                continue;
            };
            if text.is_empty() {
                self.nodes.remove(&child);
                continue;
            }
            match kept.last().copied().filter(|&prev| self.is_text(prev)) {
                Some(prev) => {
                    if let NodeKind::Text(prev_text) = &mut self.node_mut(prev)?.kind {
                        prev_text.push_str(&text);
                    }
                    self.nodes.remove(&child);
                }
                None => kept.push(child),
            }
        }

        *self.node_mut(id)?.children_mut() = kept;
        Ok(())
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}
