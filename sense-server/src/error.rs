//! Error types for the Sense prediction service
//!
//! Module-specific error type using thiserror, with an axum response mapping
//! so every failure surfaces to the client as a JSON error body instead of a
//! framework default page.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sense_common::api::ErrorResponse;
use thiserror::Error;

/// Main error type for the prediction service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Audio decoding errors
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Audio encoding errors (fixture/converter output)
    #[error("Audio encode error: {0}")]
    Encode(String),

    /// Feature extraction errors
    #[error("Feature extraction error: {0}")]
    Feature(String),

    /// Model loading or inference errors
    #[error("Model error: {0}")]
    Model(String),

    /// Label table loading errors
    #[error("Label table error: {0}")]
    Labels(String),

    /// Predicted index has no label in the reference table
    #[error("Unknown label index: {0}")]
    UnknownLabel(usize),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the service Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status for this error.
    ///
    /// A corrupt or undecodable upload is reported as a server error, never
    /// as a 200 with a fabricated prediction.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        assert_eq!(
            Error::BadRequest("missing field".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn decode_failure_maps_to_500() {
        assert_eq!(
            Error::Decode("unreadable".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
