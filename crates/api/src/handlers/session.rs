//! Handler exposing the caller's session to the widget.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use marginalia_core::roles::AuthInfoWithRole;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/comments/{page}/auth
///
/// Return the signed-in user together with their resolved role.
pub async fn get_session(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(_page): Path<String>,
) -> AppResult<impl IntoResponse> {
    let role = state.storage.get_role(&user).await?;

    Ok(Json(AuthInfoWithRole { auth: user, role }))
}
