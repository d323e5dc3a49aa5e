//! Plain-text projection of a rich-content tree.
//!
//! The projection is what length and emptiness limits are measured against:
//! text leaves contribute their text, images render as `[Image](src)` and
//! mentions as `@label`, everything else contributes its own text (if any)
//! followed by its children, in document order.

use super::node::{ImageAttrs, MentionAttrs, NodeKind, RichContent};

/// Renders the special node types during projection.
///
/// Implementors may keep state (counters, collected issues); the projector
/// calls them exactly once per matching node, in document order.
pub trait NodeRenderer {
    fn render_image(&mut self, node: &RichContent) -> String;
    fn render_mention(&mut self, node: &RichContent) -> String;
}

/// Default renderer: markdown-style image links and `@name` mentions.
/// Malformed special nodes render as nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRenderer;

impl NodeRenderer for PlainTextRenderer {
    fn render_image(&mut self, node: &RichContent) -> String {
        ImageAttrs::from_node(node)
            .map(|attrs| format!("[Image]({})", attrs.src))
            .unwrap_or_default()
    }

    fn render_mention(&mut self, node: &RichContent) -> String {
        MentionAttrs::from_node(node)
            .map(|attrs| format!("@{}", attrs.display_name()))
            .unwrap_or_default()
    }
}

/// Flatten `node` into text, delegating special nodes to `renderer`.
pub fn project_text<R: NodeRenderer + ?Sized>(node: &RichContent, renderer: &mut R) -> String {
    let mut out = String::new();
    project_into(node, renderer, &mut out);
    out
}

/// Flatten `node` with the [`PlainTextRenderer`].
pub fn plain_text(node: &RichContent) -> String {
    project_text(node, &mut PlainTextRenderer)
}

fn project_into<R: NodeRenderer + ?Sized>(node: &RichContent, renderer: &mut R, out: &mut String) {
    match node.kind() {
        NodeKind::Image => out.push_str(&renderer.render_image(node)),
        NodeKind::Mention => out.push_str(&renderer.render_mention(node)),
        NodeKind::Text | NodeKind::Other => {
            if let Some(text) = &node.text {
                out.push_str(text);
            }
            for child in node.children() {
                project_into(child, renderer, out);
            }
        }
    }
}
