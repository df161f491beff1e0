//! Request-boundary errors and their JSON responses

use crate::core::{FieldError, OncoError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Request keys absent from the body, in schema order
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid input: {0}")]
    Invalid(#[from] FieldError),

    #[error("{0}")]
    Internal(String),
}

impl From<OncoError> for ApiError {
    fn from(err: OncoError) -> Self {
        match err {
            OncoError::Validation(e) => ApiError::Invalid(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_) | ApiError::BadRequest(_) | ApiError::Invalid(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Error occurred: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
