//! Handler for mention autocomplete.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use marginalia_core::schemas::{validate_user_query, UserQuery};
use marginalia_core::types::UserProfile;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/comments/{page}/users?name=
///
/// Search users by name. Returns an empty list when no user directory is
/// configured.
pub async fn query_users(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(page): Path<String>,
    Query(params): Query<UserQuery>,
) -> AppResult<impl IntoResponse> {
    validate_user_query(&params.name)?;

    let users: Vec<UserProfile> = match &state.users {
        Some(directory) => directory.query_users(&page, params.name.trim()).await?,
        None => Vec::new(),
    };

    Ok(Json(users))
}
