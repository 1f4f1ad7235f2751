//! Error types for txview-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use txview_core::CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::TransactionNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            ApiError::Core(CoreError::SourceLoad(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Core(CoreError::Deletion(_)) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            ApiError::Core(error) => serde_json::to_value(error.to_details())
                .unwrap_or_else(|_| serde_json::json!({ "message": error.to_string() })),
            ApiError::BadRequest { message } => {
                serde_json::json!({ "code": "BAD_REQUEST", "message": message })
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{} -> {}", self, status);
        } else {
            log::debug!("{} -> {}", self, status);
        }
        (status, Json(self.body())).into_response()
    }
}
