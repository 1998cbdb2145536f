//! Mapping of [`PlateError`] onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use platelog_core::PlateError;
use serde_json::json;
use tracing::error;

/// Error returned by API handlers, rendered as `{ "error": "<message>" }`.
#[derive(Debug)]
pub struct ApiError(pub PlateError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PlateError::EmptyImage | PlateError::UnsupportedMedia(_) => StatusCode::BAD_REQUEST,
            PlateError::Inference { .. } => StatusCode::BAD_GATEWAY,
            PlateError::EmptyLog | PlateError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            PlateError::Export(_) | PlateError::Config(_) | PlateError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PlateError> for ApiError {
    fn from(err: PlateError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (PlateError::EmptyImage, StatusCode::BAD_REQUEST),
            (PlateError::UnsupportedMedia("text/plain".into()), StatusCode::BAD_REQUEST),
            (
                PlateError::Inference { provider: "gemini".into(), message: "429".into() },
                StatusCode::BAD_GATEWAY,
            ),
            (PlateError::EmptyLog, StatusCode::NOT_FOUND),
            (PlateError::SessionNotFound("x".into()), StatusCode::NOT_FOUND),
            (PlateError::Export("zip".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }
}
