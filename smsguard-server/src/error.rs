//! HTTP error responses.

use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use smsguard_types::ClassifyError;

/// Body text for requests without a usable message.
pub const NO_TEXT: &str = "No text provided";

/// Errors returned by handlers, rendered as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    /// Classification failed.
    Classify(ClassifyError),
    /// The request body could not be read as JSON.
    BadRequest(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Classify(ClassifyError::EmptyInput) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Classify(ClassifyError::ModelNotTrained) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Classify(ClassifyError::EmptyInput) => f.write_str(NO_TEXT),
            ApiError::Classify(e) => write!(f, "{}", e),
            ApiError::BadRequest(msg) => f.write_str(msg),
        }
    }
}

impl core::error::Error for ApiError {}

impl From<ClassifyError> for ApiError {
    fn from(e: ClassifyError) -> Self {
        ApiError::Classify(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
