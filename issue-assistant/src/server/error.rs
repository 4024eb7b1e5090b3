//! HTTP error responses.

use crate::pipeline::{AnalysisError, ErrorKind, Stage};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON body returned for a failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub detail: String,
    /// Machine-readable classification.
    pub kind: ErrorKind,
    /// Stage that failed.
    pub stage: Stage,
}

/// A failed analysis rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Returns the status code that will be sent.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the body that will be sent.
    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl From<AnalysisError> for ApiError {
    fn from(error: AnalysisError) -> Self {
        let status =
            StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            body: ErrorBody {
                detail: error.to_string(),
                kind: error.kind(),
                stage: error.stage(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
