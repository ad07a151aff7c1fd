use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The request has no authenticated principal, or the principal is no
    /// longer active. The response shape is frozen for existing clients:
    /// they match on the 405 status and the exact body.
    #[error("usuário inativo")]
    InactiveUser,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InactiveUser => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({ "error": "Usuário inativo" })),
            )
                .into_response(),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": {
                        "message": format!("{} not found", what),
                        "type": "invalid_request_error",
                        "code": "not_found",
                    }
                })),
            )
                .into_response(),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                internal_server_error()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                internal_server_error()
            }
        }
    }
}

fn internal_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": {
                "message": "internal server error",
                "type": "internal_error",
                "code": "internal_server_error",
            }
        })),
    )
        .into_response()
}
