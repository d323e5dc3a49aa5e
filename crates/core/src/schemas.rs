//! Request bodies and query parameters of the comments API.
//!
//! Bodies are strict: unknown keys are rejected at deserialization time.
//! Content arrives as raw JSON and only becomes a [`RichContent`] after
//! passing [`validate_content`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{validate_content, RichContent};
use crate::error::CoreError;

/// Default number of comments per page.
pub const DEFAULT_COMMENT_LIMIT: i64 = 30;

/// Maximum number of comments per page.
pub const MAX_COMMENT_LIMIT: i64 = 100;

/// Maximum length of a user search fragment.
pub const MAX_USER_QUERY_LENGTH: usize = 100;

/// Body of `POST /{page}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostCommentBody {
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
}

/// A post that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedPost {
    pub content: RichContent,
    pub thread: Option<String>,
}

impl PostCommentBody {
    pub fn validate(self) -> Result<ValidatedPost, CoreError> {
        let content = validate_content(&self.content)?;
        Ok(ValidatedPost {
            content,
            thread: self.thread,
        })
    }
}

/// Body of `PATCH /{page}/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCommentBody {
    pub content: Value,
}

impl UpdateCommentBody {
    pub fn validate(self) -> Result<RichContent, CoreError> {
        Ok(validate_content(&self.content)?)
    }
}

/// Body of `POST /{page}/{id}/rate`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetRateBody {
    pub like: bool,
}

/// Ordering of a comment listing by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Oldest,
    #[default]
    Newest,
}

/// Query string of `GET /{page}`.
///
/// `before` and `after` are exclusive bounds in Unix milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCommentsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Query string of `GET /{page}/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuery {
    pub name: String,
}

/// Clamp a user-provided page size to `1..=MAX_COMMENT_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> usize {
    // The clamp keeps the value positive, so the cast cannot wrap.
    limit
        .unwrap_or(DEFAULT_COMMENT_LIMIT)
        .clamp(1, MAX_COMMENT_LIMIT) as usize
}

/// Validate a mention search fragment: non-blank and reasonably short.
pub fn validate_user_query(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name query cannot be empty".into()));
    }
    if name.chars().count() > MAX_USER_QUERY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name query exceeds maximum length of {MAX_USER_QUERY_LENGTH} characters"
        )));
    }
    Ok(())
}
