//! HTML rendering of stored rich content.
//!
//! Output is built with maud, so every text value and attribute is escaped.
//! Links and images are only emitted for `http(s)` URLs; anything else falls
//! back to plain text or nothing.

use maud::{html, Markup};
use serde::Deserialize;
use serde_json::Value;

use crate::content::{ImageAttrs, MentionAttrs, NodeKind, RichContent};

/// Formatting mark attached to a text leaf, e.g. `{ "type": "bold" }`.
#[derive(Debug, Deserialize)]
struct Mark {
    #[serde(rename = "type")]
    mark_type: String,
    #[serde(default)]
    attrs: Option<Value>,
}

/// Render a content tree to HTML markup.
pub fn render_content(node: &RichContent) -> Markup {
    match node.kind() {
        NodeKind::Text => render_text(node),
        NodeKind::Image => render_image(node),
        NodeKind::Mention => render_mention(node),
        NodeKind::Other => render_block(node),
    }
}

/// Render a content tree to an HTML string.
pub fn render_to_string(node: &RichContent) -> String {
    render_content(node).into_string()
}

/// Only absolute http(s) URLs are emitted into `href`/`src`.
pub fn is_safe_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn render_children(node: &RichContent) -> Markup {
    html! {
        @for child in node.children() {
            (render_content(child))
        }
    }
}

fn render_block(node: &RichContent) -> Markup {
    match node.node_type.as_str() {
        "paragraph" => html! { p { (render_children(node)) } },
        "hardBreak" => html! { br; },
        "codeBlock" => {
            let language = node
                .attr("language")
                .and_then(Value::as_str)
                .unwrap_or("plaintext");
            html! {
                pre {
                    code class=(format!("language-{language}")) { (render_children(node)) }
                }
            }
        }
        _ => render_children(node),
    }
}

fn render_text(node: &RichContent) -> Markup {
    let text = node.text.as_deref().unwrap_or_default();
    let marks: Vec<Mark> = node
        .extra
        .get("marks")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    // The first mark ends up outermost.
    marks.iter().rev().fold(html! { (text) }, |inner, mark| {
        match mark.mark_type.as_str() {
            "bold" => html! { strong { (inner) } },
            "italic" => html! { em { (inner) } },
            "strike" => html! { s { (inner) } },
            "code" => html! { code { (inner) } },
            "link" => {
                let href = mark
                    .attrs
                    .as_ref()
                    .and_then(|a| a.get("href"))
                    .and_then(Value::as_str)
                    .filter(|href| is_safe_url(href));
                match href {
                    Some(href) => html! {
                        a href=(href) rel="noopener noreferrer nofollow" target="_blank" { (inner) }
                    },
                    None => inner,
                }
            }
            _ => inner,
        }
    })
}

fn render_image(node: &RichContent) -> Markup {
    match ImageAttrs::from_node(node).filter(|attrs| is_safe_url(&attrs.src)) {
        Some(attrs) => {
            let alt = node.attr("alt").and_then(Value::as_str).unwrap_or("");
            html! {
                img src=(attrs.src) width=(attrs.width) height=(attrs.height) alt=(alt) loading="lazy";
            }
        }
        None => html! {},
    }
}

fn render_mention(node: &RichContent) -> Markup {
    match MentionAttrs::from_node(node) {
        Some(attrs) => html! {
            span class="mention" data-id=(attrs.id) { "@" (attrs.display_name()) }
        },
        None => html! {},
    }
}
