use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marginalia_core::error::CoreError;
use marginalia_storage::StorageError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StorageError`] for backend
/// failures. Implements [`IntoResponse`] to produce consistent JSON error
/// bodies of the form `{ "message", "code", "issues"? }`; the `message`
/// field is what clients surface to users.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `marginalia_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An error reported by the storage backend.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut issues = None;

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::InvalidContent(found) => {
                    issues = Some(found.clone());
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", found.to_string())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Storage errors ---
            AppError::Storage(err) => classify_storage_error(err),
        };

        let mut body = json!({
            "message": message,
            "code": code,
        });
        if let Some(issues) = issues {
            body["issues"] = json!(issues);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a storage error into an HTTP status, error code, and message.
///
/// Missing records map to 404; backend failures are logged and sanitized.
fn classify_storage_error(err: &StorageError) -> (StatusCode, &'static str, String) {
    match err {
        StorageError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        StorageError::Backend(msg) => {
            tracing::error!(error = %msg, "Storage backend error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
