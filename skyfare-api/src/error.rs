use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skyfare_core::{ProviderError, ValidationErrors};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid request body: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("rate limit exceeded")]
    RateLimited,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => {
                tracing::debug!("Rejected request body: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "success": false, "error": "Request body must be valid JSON" }),
                )
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": "Invalid search request",
                    "details": errors,
                }),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "success": false,
                    "error": "Too many requests. Please try again later.",
                }),
            ),
            AppError::Provider(err) => {
                tracing::error!("Flight provider failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "error": "Failed to fetch flight offers" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
