//! Route definitions for the comments resource, mounted at `/api/comments`.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{comments, rates, session, users};
use crate::state::AppState;

/// Comment routes mounted at `/api/comments`.
///
/// ```text
/// GET    /{page}              -> list_comments
/// POST   /{page}              -> post_comment
/// POST   /{page}/preview      -> preview_comment
/// GET    /{page}/users        -> query_users
/// GET    /{page}/auth         -> get_session
/// PATCH  /{page}/{id}         -> edit_comment
/// DELETE /{page}/{id}         -> delete_comment
/// POST   /{page}/{id}/rate    -> set_rate
/// DELETE /{page}/{id}/rate    -> delete_rate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{page}",
            get(comments::list_comments).post(comments::post_comment),
        )
        .route("/{page}/preview", post(comments::preview_comment))
        .route("/{page}/users", get(users::query_users))
        .route("/{page}/auth", get(session::get_session))
        .route(
            "/{page}/{id}",
            patch(comments::edit_comment).delete(comments::delete_comment),
        )
        .route(
            "/{page}/{id}/rate",
            post(rates::set_rate).delete(rates::delete_rate),
        )
}
