//! HTTP mapping for engine errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use liars_dice::{EngineError, ErrorKind, SettlementError};
use serde::Serialize;

/// JSON body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

/// Engine error on its way out as an HTTP response.
///
/// Validation and state errors are the caller's fault and map to
/// `400 Bad Request`; settlement failures map to `502 Bad Gateway`.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Validation | ErrorKind::State => StatusCode::BAD_REQUEST,
            ErrorKind::External => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.0.client_message(),
            kind: self.0.kind(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        Self(err.into())
    }
}
