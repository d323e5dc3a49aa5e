//! Request handlers for the comments API.
//!
//! Handlers check permissions, validate bodies through
//! `marginalia_core::schemas`, delegate persistence to the configured
//! [`StorageAdapter`](marginalia_storage::StorageAdapter) and map errors via
//! [`AppError`](crate::error::AppError).

pub mod comments;
pub mod rates;
pub mod session;
pub mod users;

use marginalia_core::error::CoreError;
use marginalia_storage::CommentRef;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Look up the author and thread of a comment, or fail with 404.
pub(crate) async fn require_comment(
    state: &AppState,
    page: &str,
    id: &str,
) -> AppResult<CommentRef> {
    state
        .storage
        .get_comment_ref(page, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Comment",
                id: id.to_string(),
            })
        })
}
