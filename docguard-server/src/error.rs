//! HTTP error type
//!
//! Every handler returns `Result<_, ApiError>`. The response body is always
//! `{ "error": <message>, "code": <STABLE_CODE> }`; pipeline refusals reuse
//! the rejection codes of docguard-core so clients see one vocabulary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docguard_core::Rejection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body could not be decoded (broken multipart, oversized JSON field)
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Invalid zone id: {0}")]
    InvalidZone(String),

    /// Upload request without any `file` part
    #[error("No file provided. Use one or more 'file' fields in multipart form.")]
    MissingFile,

    #[error("Zone '{0}' has no files")]
    ZoneNotFound(String),

    #[error("File '{name}' not found in zone '{zone}'")]
    FileNotFound { zone: String, name: String },

    /// The pipeline refused the whole batch
    #[error("{0}")]
    Refused(Rejection),

    /// Server-side failure; the detail is logged, never returned
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn file_not_found(zone: &str, name: &str) -> Self {
        Self::FileNotFound {
            zone: zone.to_string(),
            name: name.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Malformed(_) | Self::InvalidZone(_) | Self::MissingFile => StatusCode::BAD_REQUEST,
            Self::ZoneNotFound(_) | Self::FileNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Refused(Rejection::CapacityExceeded { .. }) => StatusCode::CONFLICT,
            Self::Refused(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "MALFORMED_REQUEST",
            Self::InvalidZone(_) => "INVALID_ZONE",
            Self::MissingFile => "MISSING_FILE",
            Self::ZoneNotFound(_) | Self::FileNotFound { .. } => "NOT_FOUND",
            Self::Refused(reason) => reason.code(),
            Self::Storage(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        if status.is_server_error() {
            tracing::error!(status = %status, code, error = %self, "Request failed");
        } else if let Self::Refused(reason) = &self {
            tracing::warn!(status = %status, code, reason = %reason, "Upload batch refused");
        } else {
            tracing::warn!(status = %status, code, error = %self, "Client error");
        }

        let body = serde_json::json!({
            "error": self.public_message(),
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
