//! Handlers for liking and disliking comments.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use marginalia_core::schemas::SetRateBody;

use super::require_comment;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/comments/{page}/{id}/rate
///
/// Set (or replace) the caller's rate on a comment.
pub async fn set_rate(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((page, id)): Path<(String, String)>,
    Json(body): Json<SetRateBody>,
) -> AppResult<impl IntoResponse> {
    require_comment(&state, &page, &id).await?;

    state.storage.set_rate(&page, &id, body.like, &user).await?;

    tracing::debug!(comment_id = %id, user_id = %user.id, like = body.like, "Rate set");

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/comments/{page}/{id}/rate
///
/// Remove the caller's rate on a comment, if any.
pub async fn delete_rate(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((page, id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    require_comment(&state, &page, &id).await?;

    state.storage.delete_rate(&page, &id, &user).await?;

    tracing::debug!(comment_id = %id, user_id = %user.id, "Rate removed");

    Ok(StatusCode::NO_CONTENT)
}
