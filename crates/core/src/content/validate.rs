//! Structural and semantic validation of submitted rich content.
//!
//! Every rule is checked and all issues are reported together, with two
//! exceptions that stop early: a tree that does not have the node shape at
//! all (or nests too deeply), and a projection that is empty.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::node::{ImageAttrs, MentionAttrs, RichContent};
use super::projector::{project_text, NodeRenderer};

/// Maximum projected text length, in UTF-16 code units.
pub const MAX_TEXT_LENGTH: usize = 2_000;

/// Maximum serialized JSON length of a document, in UTF-16 code units.
pub const MAX_SERIALIZED_LENGTH: usize = MAX_TEXT_LENGTH * 10;

/// Maximum number of image nodes in one document.
pub const MAX_IMAGES: usize = 2;

/// Maximum nesting depth of a document.
pub const MAX_DEPTH: usize = 64;

/// Which rule a [`ContentIssue`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    MalformedNode,
    TooDeep,
    InvalidImage,
    InvalidMention,
    Empty,
    TooLong,
    TooManyImages,
    TooLarge,
}

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentIssue {
    pub code: IssueKind,
    pub message: String,
}

impl ContentIssue {
    fn new(code: IssueKind) -> Self {
        let message = match code {
            IssueKind::MalformedNode => "Malformed content".to_string(),
            IssueKind::TooDeep => "Content is nested too deeply".to_string(),
            IssueKind::InvalidImage => "invalid image element in content".to_string(),
            IssueKind::InvalidMention => "invalid mention element in content".to_string(),
            IssueKind::Empty => "Content can't be empty".to_string(),
            IssueKind::TooLong => {
                format!("Content can't be longer than {MAX_TEXT_LENGTH} characters")
            }
            IssueKind::TooManyImages => format!("You cannot add more than {MAX_IMAGES} images"),
            IssueKind::TooLarge => "Content is too large".to_string(),
        };
        Self { code, message }
    }
}

/// Non-empty list of issues produced by a failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentIssues(pub Vec<ContentIssue>);

impl ContentIssues {
    pub fn iter(&self) -> impl Iterator<Item = &ContentIssue> {
        self.0.iter()
    }

    pub fn contains(&self, code: IssueKind) -> bool {
        self.0.iter().any(|issue| issue.code == code)
    }
}

impl fmt::Display for ContentIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|i| i.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ContentIssues {}

/// Projection renderer that validates special nodes as it goes.
#[derive(Default)]
struct CheckingRenderer {
    image_count: usize,
    issues: Vec<ContentIssue>,
}

impl NodeRenderer for CheckingRenderer {
    fn render_image(&mut self, node: &RichContent) -> String {
        self.image_count += 1;
        match ImageAttrs::from_node(node) {
            Some(attrs) => format!("[Image]({})", attrs.src),
            None => {
                self.issues.push(ContentIssue::new(IssueKind::InvalidImage));
                String::new()
            }
        }
    }

    fn render_mention(&mut self, node: &RichContent) -> String {
        match MentionAttrs::from_node(node) {
            Some(attrs) => format!("@{}", attrs.display_name()),
            None => {
                self.issues.push(ContentIssue::new(IssueKind::InvalidMention));
                String::new()
            }
        }
    }
}

/// Validate an untrusted JSON document, returning the typed tree on success.
pub fn validate_content(value: &Value) -> Result<RichContent, ContentIssues> {
    let node = RichContent::deserialize(value).map_err(|e| {
        ContentIssues(vec![ContentIssue {
            code: IssueKind::MalformedNode,
            message: format!("Malformed content: {e}"),
        }])
    })?;

    if node.depth() > MAX_DEPTH {
        return Err(ContentIssues(vec![ContentIssue::new(IssueKind::TooDeep)]));
    }

    let serialized_len = value.to_string().encode_utf16().count();
    check_rules(&node, serialized_len)?;
    Ok(node)
}

fn check_rules(node: &RichContent, serialized_len: usize) -> Result<(), ContentIssues> {
    let mut renderer = CheckingRenderer::default();
    let projected = project_text(node, &mut renderer);
    let text = projected.trim();
    let mut issues = renderer.issues;

    if text.is_empty() {
        issues.push(ContentIssue::new(IssueKind::Empty));
        return Err(ContentIssues(issues));
    }

    if text.encode_utf16().count() > MAX_TEXT_LENGTH {
        issues.push(ContentIssue::new(IssueKind::TooLong));
    }

    if renderer.image_count > MAX_IMAGES {
        issues.push(ContentIssue::new(IssueKind::TooManyImages));
    }

    if serialized_len > MAX_SERIALIZED_LENGTH {
        issues.push(ContentIssue::new(IssueKind::TooLarge));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ContentIssues(issues))
    }
}
