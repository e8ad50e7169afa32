//! HTTP error mapping.
//!
//! | Outcome                         | Status |
//! |---------------------------------|--------|
//! | Path parameter fails validation | 400    |
//! | Entity absent / unknown route   | 404    |
//! | Route exists, method does not   | 405    |
//! | Request exceeded `API_TIMEOUT`  | 408    |
//! | Upstream node failure           | 424    |

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::NodeError;
use crate::params::ValidationError;

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error("method {method} not allowed for {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error(transparent)]
    Dependency(#[from] NodeError),

    #[error("request did not complete within {0:?}")]
    Timeout(Duration),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Dependency(_) => StatusCode::FAILED_DEPENDENCY,
            ApiError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::RouteNotFound(_) => "ROUTE_NOT_FOUND",
            ApiError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            ApiError::Dependency(_) => "FAILED_DEPENDENCY",
            ApiError::Timeout(_) => "REQUEST_TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::from(&self))).into_response()
    }
}
