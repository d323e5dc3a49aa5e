//! Capability traits a storage backend implements.

use async_trait::async_trait;
use marginalia_core::content::RichContent;
use marginalia_core::roles::Role;
use marginalia_core::schemas::ValidatedPost;
use marginalia_core::types::{AuthInfo, UserProfile};

use crate::error::StorageResult;
use crate::models::{CommentQuery, CommentRef, SerializedComment};

/// Everything the comments API needs from a persistence backend.
///
/// Permission checks happen in the API layer before these are called; a
/// backend only has to keep its own data consistent. Every method is scoped
/// to a page, and a comment id that belongs to another page is treated as
/// missing.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// List comments of a page. `viewer` is used to fill in `liked`.
    async fn get_comments(
        &self,
        page: &str,
        query: &CommentQuery,
        viewer: Option<&AuthInfo>,
    ) -> StorageResult<Vec<SerializedComment>>;

    /// Persist a new comment written by `author`.
    async fn post_comment(
        &self,
        page: &str,
        post: ValidatedPost,
        author: &AuthInfo,
    ) -> StorageResult<SerializedComment>;

    /// Replace the content of an existing comment and mark it edited.
    async fn update_comment(
        &self,
        page: &str,
        id: &str,
        content: RichContent,
        auth: &AuthInfo,
    ) -> StorageResult<()>;

    /// Remove a comment together with every reply below it and their rates.
    async fn delete_comment(&self, page: &str, id: &str, auth: &AuthInfo) -> StorageResult<()>;

    /// Create or replace the rate of `auth` on a comment.
    async fn set_rate(
        &self,
        page: &str,
        id: &str,
        like: bool,
        auth: &AuthInfo,
    ) -> StorageResult<()>;

    /// Remove the rate of `auth` on a comment, if any.
    async fn delete_rate(&self, page: &str, id: &str, auth: &AuthInfo) -> StorageResult<()>;

    /// Resolve the role of a signed-in user, `None` for regular users.
    async fn get_role(&self, auth: &AuthInfo) -> StorageResult<Option<Role>>;

    /// Author and thread of a comment, `None` if it does not exist on this page.
    async fn get_comment_ref(&self, page: &str, id: &str) -> StorageResult<Option<CommentRef>>;
}

/// User lookup backing mention autocomplete.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn query_users(&self, page: &str, name: &str) -> StorageResult<Vec<UserProfile>>;
}
