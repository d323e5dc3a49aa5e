//! Rich-content documents: the node model, the plain-text projection and the
//! structural validator applied before anything is persisted.
//!
//! - [`node`] -- [`RichContent`] tree and typed views of special nodes.
//! - [`projector`] -- depth-first flattening into plain text.
//! - [`validate`] -- rule checks producing a list of [`ContentIssue`]s.

pub mod node;
pub mod projector;
pub mod validate;

pub use node::{ImageAttrs, MentionAttrs, NodeKind, RichContent};
pub use projector::{plain_text, project_text, NodeRenderer, PlainTextRenderer};
pub use validate::{validate_content, ContentIssue, ContentIssues, IssueKind};
