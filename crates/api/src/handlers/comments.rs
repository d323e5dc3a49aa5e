//! Handlers for listing, posting, editing and deleting comments.

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use marginalia_core::error::CoreError;
use marginalia_core::render::render_to_string;
use marginalia_core::roles::{can_delete_comment, can_edit_comment};
use marginalia_core::schemas::{ListCommentsQuery, PostCommentBody, UpdateCommentBody};
use marginalia_storage::CommentQuery;

use super::require_comment;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

/// GET /api/comments/{page}
///
/// List comments of a page. Anonymous viewers are allowed; signed-in viewers
/// also get their own rate in `liked`.
pub async fn list_comments(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(page): Path<String>,
    Query(params): Query<ListCommentsQuery>,
) -> AppResult<impl IntoResponse> {
    let query = CommentQuery::try_from(params)?;

    let comments = state
        .storage
        .get_comments(&page, &query, viewer.as_ref())
        .await?;

    Ok(Json(comments))
}

/// POST /api/comments/{page}
///
/// Validate and persist a new comment. Replies must target an existing
/// top-level comment on the same page.
pub async fn post_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(page): Path<String>,
    Json(body): Json<PostCommentBody>,
) -> AppResult<impl IntoResponse> {
    let post = body.validate()?;

    if let Some(thread) = post.thread.as_deref() {
        let target = require_comment(&state, &page, thread).await?;
        if target.thread.is_some() {
            return Err(AppError::Core(CoreError::Validation(
                "Replies can only be posted to top-level comments".into(),
            )));
        }
    }

    let comment = state.storage.post_comment(&page, post, &user).await?;

    tracing::info!(
        comment_id = %comment.id,
        page = %page,
        thread = ?comment.thread,
        user_id = %user.id,
        "Comment posted",
    );

    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /api/comments/{page}/{id}
///
/// Replace the content of a comment. Only its author may edit it.
pub async fn edit_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((page, id)): Path<(String, String)>,
    Json(body): Json<UpdateCommentBody>,
) -> AppResult<impl IntoResponse> {
    let author_id = require_comment(&state, &page, &id).await?.author_id;
    if !can_edit_comment(&user, &author_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author can edit this comment".into(),
        )));
    }

    let content = body.validate()?;
    state
        .storage
        .update_comment(&page, &id, content, &user)
        .await?;

    tracing::info!(comment_id = %id, page = %page, user_id = %user.id, "Comment edited");

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/comments/{page}/{id}
///
/// Delete a comment with its replies. Allowed for the author and for users
/// whose role grants `canDelete`.
pub async fn delete_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((page, id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let author_id = require_comment(&state, &page, &id).await?.author_id;

    let role = if author_id == user.id {
        None
    } else {
        state.storage.get_role(&user).await?
    };

    if !can_delete_comment(&user, role, &author_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not allowed to delete this comment".into(),
        )));
    }

    state.storage.delete_comment(&page, &id, &user).await?;

    tracing::info!(
        comment_id = %id,
        page = %page,
        user_id = %user.id,
        moderated = author_id != user.id,
        "Comment deleted",
    );

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/comments/{page}/preview
///
/// Validate a draft and return it rendered as an HTML fragment, without
/// persisting anything.
pub async fn preview_comment(
    Path(_page): Path<String>,
    Json(body): Json<UpdateCommentBody>,
) -> AppResult<impl IntoResponse> {
    let content = body.validate()?;
    let html = render_to_string(&content);

    Ok(([(CONTENT_TYPE, "text/html; charset=utf-8")], html))
}
