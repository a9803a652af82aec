use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use lockstep::{CoordinatorError, StoreError, ValidationError};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    #[error("cleanup failed: {0}")]
    Cleanup(#[from] StoreError),
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MalformedJson(_) | GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Coordinator(_) | GatewayError::Cleanup(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::MalformedJson(_) | GatewayError::Validation(_) => ValidationError::CODE,
            GatewayError::Coordinator(e) => e.code(),
            GatewayError::Cleanup(_) => "STORE_ERROR",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}
