pub mod comments;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /comments/{page}                  list (GET), post (POST)
/// /comments/{page}/preview          render a draft (POST)
/// /comments/{page}/users            mention autocomplete (GET)
/// /comments/{page}/auth             current session (GET)
/// /comments/{page}/{id}             edit (PATCH), delete (DELETE)
/// /comments/{page}/{id}/rate        set (POST), remove (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/comments", comments::router())
}
