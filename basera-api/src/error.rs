use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use basera_core::CoreError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Authentication(String),
    Authorization(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Upstream(String),
    Internal(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// Repository failures are opaque infrastructure errors.
    pub fn from_repo(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        AppError::Internal(err.to_string())
    }

    /// Domain errors carry their own category; everything the core did not
    /// classify becomes a 500.
    pub fn from_core(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => AppError::Validation(msg),
            CoreError::NotFound(msg) => AppError::NotFound(msg),
            CoreError::Conflict(msg) => AppError::Conflict(msg),
            CoreError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream provider failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream provider error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
