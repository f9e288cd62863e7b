//! HTML serialization of the document tree
//!
//! Paragraphs become `<p>`, block containers `<div>`, inline elements keep
//! their tag, and markup runs become spans carrying the annotation id, the
//! marker classes and the inline style.

use crate::{RenderError, Result};
use doc_model::{DocumentTree, Markup, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Configuration for HTML output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlOptions {
    /// Element used for markup wrappers
    pub markup_tag: String,
    /// Attribute carrying the annotation id
    pub id_attribute: String,
    /// Element used for paragraphs
    pub paragraph_tag: String,
    /// Element used for block containers
    pub block_tag: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            markup_tag: "span".to_string(),
            id_attribute: "data-annotation-id".to_string(),
            paragraph_tag: "p".to_string(),
            block_tag: "div".to_string(),
        }
    }
}

/// Tag names come from host documents; anything odd renders as a span
fn safe_tag(tag: &str) -> &str {
    if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        tag
    } else {
        "span"
    }
}

/// Render the whole document body
pub fn render_html(tree: &DocumentTree, options: &HtmlOptions) -> String {
    let mut out = String::new();
    for &child in tree.children(tree.root_id()) {
        write_node(tree, child, options, &mut out);
    }
    out
}

/// Render one node and its subtree
pub fn render_node(tree: &DocumentTree, id: NodeId, options: &HtmlOptions) -> Result<String> {
    if !tree.contains(id) {
        return Err(RenderError::RenderFailed(format!("node {} not found", id)));
    }
    let mut out = String::new();
    write_node(tree, id, options, &mut out);
    Ok(out)
}

fn write_node(tree: &DocumentTree, id: NodeId, options: &HtmlOptions, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let tag = match &node.kind {
        NodeKind::Text(text) => {
            out.push_str(&html_escape::encode_text(text));
            return;
        }
        NodeKind::Root => {
            write_children(tree, id, options, out);
            return;
        }
        NodeKind::Block => safe_tag(&options.block_tag),
        NodeKind::Paragraph => safe_tag(&options.paragraph_tag),
        NodeKind::Inline { tag } => safe_tag(tag),
        NodeKind::Markup(markup) => {
            let tag = safe_tag(&options.markup_tag);
            write_markup_open(tag, markup, options, out);
            write_children(tree, id, options, out);
            let _ = write!(out, "</{}>", tag);
            return;
        }
    };
    let _ = write!(out, "<{}>", tag);
    write_children(tree, id, options, out);
    let _ = write!(out, "</{}>", tag);
}

fn write_children(tree: &DocumentTree, id: NodeId, options: &HtmlOptions, out: &mut String) {
    for &child in tree.children(id) {
        write_node(tree, child, options, out);
    }
}

fn safe_attribute(name: &str) -> &str {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        name
    } else {
        "data-annotation-id"
    }
}

fn write_markup_open(tag: &str, markup: &Markup, options: &HtmlOptions, out: &mut String) {
    let _ = write!(
        out,
        "<{} {}=\"{}\"",
        tag,
        safe_attribute(&options.id_attribute),
        html_escape::encode_double_quoted_attribute(markup.annotation_id.as_str())
    );
    if !markup.classes.is_empty() {
        let _ = write!(
            out,
            " class=\"{}\"",
            html_escape::encode_double_quoted_attribute(&markup.classes.join(" "))
        );
    }
    if !markup.style.is_empty() {
        let _ = write!(
            out,
            " style=\"{}\"",
            html_escape::encode_double_quoted_attribute(&markup.style)
        );
    }
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{AnnotationId, BlockSpec, InlineSpec, MarkupShape};

    #[test]
    fn test_render_plain_document() {
        let tree = DocumentTree::from_blocks(&[
            BlockSpec::paragraph(vec![
                InlineSpec::text("a < b "),
                InlineSpec::element("em", vec![InlineSpec::text("& c")]),
            ]),
            BlockSpec::container(vec![BlockSpec::plain("inner")]),
        ])
        .unwrap();

        let html = render_html(&tree, &HtmlOptions::default());

        assert_eq!(html, "<p>a &lt; b <em>&amp; c</em></p><div><p>inner</p></div>");
    }

    #[test]
    fn test_render_markup_attributes() {
        let mut tree = DocumentTree::from_paragraphs(&["Hello"]).unwrap();
        let para = tree.paragraphs()[0];
        let leaf = tree.children(para)[0];
        let mut markup = Markup::new(
            AnnotationId::new("12"),
            MarkupShape::Highlight,
            "background-color: rgba(255, 255, 0, 1)",
        );
        markup.add_class("annotation-selected");
        let wrapper = tree.create_node(NodeKind::Markup(markup));
        tree.wrap_children(para, leaf, leaf, wrapper).unwrap();

        let html = render_node(&tree, para, &HtmlOptions::default()).unwrap();

        assert_eq!(
            html,
            "<p><span data-annotation-id=\"12\" class=\"annotation-selected\" \
             style=\"background-color: rgba(255, 255, 0, 1)\">Hello</span></p>"
        );
    }

    #[test]
    fn test_hostile_tag_names_are_replaced() {
        let tree = DocumentTree::from_blocks(&[BlockSpec::paragraph(vec![InlineSpec::element(
            "script onload=x",
            vec![InlineSpec::text("t")],
        )])])
        .unwrap();

        let html = render_html(&tree, &HtmlOptions::default());

        assert_eq!(html, "<p><span>t</span></p>");
    }

    #[test]
    fn test_render_missing_node_fails() {
        let tree = DocumentTree::new();
        let missing = doc_model::NodeId::new();

        assert!(matches!(
            render_node(&tree, missing, &HtmlOptions::default()),
            Err(RenderError::RenderFailed(_))
        ));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: HtmlOptions = serde_json::from_str(r#"{"markup_tag": "mark"}"#).unwrap();

        assert_eq!(options.markup_tag, "mark");
        assert_eq!(options.id_attribute, "data-annotation-id");
    }
}
