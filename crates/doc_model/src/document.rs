//! Building a document tree from block and inline specs
//!
//! Hosts ship documents as JSON: a list of blocks, each a paragraph of inline
//! content or a container of further blocks. Inline content is either a bare
//! string (a text leaf) or an element with a tag and children.

use crate::{DocumentTree, NodeId, NodeKind, Result};
use serde::{Deserialize, Serialize};

/// A block-level node description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockSpec {
    Paragraph { content: Vec<InlineSpec> },
    Container { children: Vec<BlockSpec> },
}

/// An inline node description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InlineSpec {
    Text(String),
    Element { tag: String, children: Vec<InlineSpec> },
}

impl BlockSpec {
    /// A paragraph with the given inline content
    pub fn paragraph(content: Vec<InlineSpec>) -> Self {
        BlockSpec::Paragraph { content }
    }

    /// A paragraph holding a single text leaf
    pub fn plain(text: impl Into<String>) -> Self {
        BlockSpec::Paragraph {
            content: vec![InlineSpec::text(text)],
        }
    }

    pub fn container(children: Vec<BlockSpec>) -> Self {
        BlockSpec::Container { children }
    }
}

impl InlineSpec {
    pub fn text(text: impl Into<String>) -> Self {
        InlineSpec::Text(text.into())
    }

    pub fn element(tag: impl Into<String>, children: Vec<InlineSpec>) -> Self {
        InlineSpec::Element {
            tag: tag.into(),
            children,
        }
    }
}

impl DocumentTree {
    /// Build a tree from a list of block specs
    pub fn from_blocks(blocks: &[BlockSpec]) -> Result<Self> {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        for block in blocks {
            tree.insert_block(root, block)?;
        }
        Ok(tree)
    }

    /// Build a tree of plain paragraphs, one per string
    pub fn from_paragraphs<S: AsRef<str>>(paragraphs: &[S]) -> Result<Self> {
        let blocks: Vec<BlockSpec> = paragraphs
            .iter()
            .map(|p| BlockSpec::plain(p.as_ref()))
            .collect();
        Self::from_blocks(&blocks)
    }

    /// Parse a JSON block list and build a tree from it
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let blocks: Vec<BlockSpec> = serde_json::from_str(json)?;
        Self::from_blocks(&blocks).map_err(serde::de::Error::custom)
    }

    /// Append a block (and its content) under `parent`
    pub fn insert_block(&mut self, parent: NodeId, block: &BlockSpec) -> Result<NodeId> {
        match block {
            BlockSpec::Paragraph { content } => {
                let para = self.create_node(NodeKind::Paragraph);
                self.append_child(parent, para)?;
                for inline in content {
                    self.insert_inline(para, inline)?;
                }
                Ok(para)
            }
            BlockSpec::Container { children } => {
                let block = self.create_node(NodeKind::Block);
                self.append_child(parent, block)?;
                for child in children {
                    self.insert_block(block, child)?;
                }
                Ok(block)
            }
        }
    }

    /// Append an inline node (and its content) under `parent`
    pub fn insert_inline(&mut self, parent: NodeId, inline: &InlineSpec) -> Result<NodeId> {
        match inline {
            InlineSpec::Text(text) => {
                let leaf = self.create_text(text.clone());
                self.append_child(parent, leaf)?;
                Ok(leaf)
            }
            InlineSpec::Element { tag, children } => {
                let element = self.create_node(NodeKind::Inline { tag: tag.clone() });
                self.append_child(parent, element)?;
                for child in children {
                    self.insert_inline(element, child)?;
                }
                Ok(element)
            }
        }
    }
}
