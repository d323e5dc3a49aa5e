//! Comment records and their wire representation.

use chrono::DateTime;
use marginalia_core::content::RichContent;
use marginalia_core::error::CoreError;
use marginalia_core::schemas::{clamp_limit, ListCommentsQuery, SortOrder};
use marginalia_core::types::{CommentId, Timestamp, UserProfile};
use serde::{Deserialize, Serialize};

/// A stored comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub page: String,
    /// Id of the top-level comment this one replies to.
    pub thread: Option<CommentId>,
    pub author_id: String,
    pub content: RichContent,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
    pub edited: bool,
}

/// The parts of a comment the API needs for permission and thread checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRef {
    pub author_id: String,
    /// Set when the comment is itself a reply.
    pub thread: Option<CommentId>,
}

/// A comment as returned to clients, joined with its author and rate counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedComment {
    pub id: CommentId,
    pub page: String,
    #[serde(default)]
    pub thread: Option<CommentId>,
    pub author: UserProfile,
    pub content: RichContent,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub edited: bool,
    pub likes: u32,
    pub dislikes: u32,
    /// Number of direct replies.
    pub replies: u32,
    /// The viewer's own rate, absent when anonymous or not rated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
}

/// Resolved listing parameters handed to [`crate::StorageAdapter::get_comments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentQuery {
    /// Only direct replies to this comment; top-level comments when `None`.
    pub thread: Option<CommentId>,
    pub sort: SortOrder,
    /// Exclusive upper bound on creation time.
    pub before: Option<Timestamp>,
    /// Exclusive lower bound on creation time.
    pub after: Option<Timestamp>,
    pub limit: usize,
}

impl Default for CommentQuery {
    fn default() -> Self {
        Self {
            thread: None,
            sort: SortOrder::default(),
            before: None,
            after: None,
            limit: clamp_limit(None),
        }
    }
}

impl TryFrom<ListCommentsQuery> for CommentQuery {
    type Error = CoreError;

    fn try_from(params: ListCommentsQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            thread: params.thread.filter(|t| !t.is_empty()),
            sort: params.sort.unwrap_or_default(),
            before: params.before.map(|ms| millis_to_timestamp(ms, "before")).transpose()?,
            after: params.after.map(|ms| millis_to_timestamp(ms, "after")).transpose()?,
            limit: clamp_limit(params.limit),
        })
    }
}

fn millis_to_timestamp(ms: i64, field: &str) -> Result<Timestamp, CoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| CoreError::Validation(format!("'{field}' is not a valid timestamp")))
}
