//! The recursive rich-content node.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const NODE_TEXT: &str = "text";
pub const NODE_IMAGE: &str = "image";
pub const NODE_MENTION: &str = "mention";
pub const NODE_DOC: &str = "doc";
pub const NODE_PARAGRAPH: &str = "paragraph";

/// One node of a rich-content document.
///
/// The shape is open: any `type` string is accepted, and keys
/// other than `type`, `text`, `attrs` and `content` (editor marks, for
/// instance) are carried through in [`RichContent::extra`] untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichContent {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(
        default,
        deserialize_with = "present_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<RichContent>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Dispatch tag derived from [`RichContent::node_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Image,
    Mention,
    Other,
}

impl RichContent {
    /// A bare node of the given type with no text, attrs or children.
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            text: None,
            attrs: None,
            content: None,
            extra: Map::new(),
        }
    }

    /// A `text` leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(NODE_TEXT)
        }
    }

    /// A container node holding `children`.
    pub fn container(node_type: impl Into<String>, children: Vec<RichContent>) -> Self {
        Self {
            content: Some(children),
            ..Self::new(node_type)
        }
    }

    /// A `doc` root.
    pub fn doc(children: Vec<RichContent>) -> Self {
        Self::container(NODE_DOC, children)
    }

    /// A `paragraph` container.
    pub fn paragraph(children: Vec<RichContent>) -> Self {
        Self::container(NODE_PARAGRAPH, children)
    }

    /// An `image` node with the attributes the editor always sets.
    pub fn image(src: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            attrs: Some(serde_json::json!({
                "src": src.into(),
                "width": width,
                "height": height,
            })),
            ..Self::new(NODE_IMAGE)
        }
    }

    /// A `mention` node.
    pub fn mention(id: impl Into<String>, label: Option<&str>) -> Self {
        let mut attrs = Map::new();
        attrs.insert("id".into(), Value::String(id.into()));
        if let Some(label) = label {
            attrs.insert("label".into(), Value::String(label.to_string()));
        }
        Self {
            attrs: Some(Value::Object(attrs)),
            ..Self::new(NODE_MENTION)
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.node_type.as_str() {
            NODE_TEXT => NodeKind::Text,
            NODE_IMAGE => NodeKind::Image,
            NODE_MENTION => NodeKind::Mention,
            _ => NodeKind::Other,
        }
    }

    /// Child nodes, empty for leaves.
    pub fn children(&self) -> &[RichContent] {
        self.content.as_deref().unwrap_or_default()
    }

    /// Number of nested levels, counting this node as 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(RichContent::depth)
            .max()
            .unwrap_or(0)
    }

    /// Look up a single attribute, if `attrs` is an object that has it.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.as_ref()?.as_object()?.get(key)
    }
}

/// Attributes of a well-formed `image` node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageAttrs {
    pub src: String,
    pub width: f64,
    pub height: f64,
}

impl ImageAttrs {
    /// Parse the attrs of an image node, rejecting non-`http` sources and
    /// missing or non-numeric dimensions.
    pub fn from_node(node: &RichContent) -> Option<Self> {
        let attrs: Self = serde_json::from_value(node.attrs.clone()?).ok()?;
        attrs.src.starts_with("http").then_some(attrs)
    }
}

/// Attributes of a well-formed `mention` node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MentionAttrs {
    pub id: String,
    #[serde(default, deserialize_with = "present_string")]
    pub label: Option<String>,
}

impl MentionAttrs {
    pub fn from_node(node: &RichContent) -> Option<Self> {
        serde_json::from_value(node.attrs.clone()?).ok()
    }

    /// The label when present, otherwise the raw id.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// An optional string field: it may be absent, but an explicit `null` is
/// rejected.
fn present_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Some)
}
