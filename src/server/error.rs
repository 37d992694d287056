//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::{error::GoogleGenerativeAIError, file::FileError, upload::UploadError};

/// Anything that can go wrong between receiving an upload and getting text back.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The model call failed.
    #[error(transparent)]
    Model(#[from] GoogleGenerativeAIError),
    /// Uploading the file to the Files API failed.
    #[error(transparent)]
    File(#[from] FileError),
    /// The stored upload could not be read back.
    #[error("failed to read uploaded file: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by a route handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be used.
    #[error("{0}")]
    BadRequest(String),

    /// The text route failed upstream; relayed as `{"error": message}`.
    #[error(transparent)]
    Upstream(#[from] GoogleGenerativeAIError),

    /// A media route failed; relayed as `{"error": context, "details": message}`.
    #[error("{context} {source}")]
    Generation {
        /// Route-specific failure message.
        context: &'static str,
        /// Underlying cause.
        #[source]
        source: GenerationError,
    },

    /// A media route received an unusable request.
    #[error("{context} {details}")]
    InvalidUpload {
        /// Route-specific failure message.
        context: &'static str,
        /// What was wrong with the request.
        details: String,
        /// Status to answer with.
        status: StatusCode,
    },
}

impl ApiError {
    pub(crate) fn from_upload(context: &'static str, err: UploadError) -> Self {
        match err {
            UploadError::Multipart(err) => ApiError::InvalidUpload {
                context,
                status: err.status(),
                details: err.body_text(),
            },
            UploadError::Io(err) => ApiError::Generation {
                context,
                source: GenerationError::Io(err),
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            ApiError::Upstream(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None),
            ApiError::Generation { context, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                context.to_string(),
                Some(source.to_string()),
            ),
            ApiError::InvalidUpload {
                context,
                details,
                status,
            } => (status, context.to_string(), Some(details)),
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_errors_are_internal() {
        let response = ApiError::Generation {
            context: "Failed to generate content from audio.",
            source: GenerationError::Model(GoogleGenerativeAIError::new("boom")),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_uploads_keep_their_status() {
        let response = ApiError::InvalidUpload {
            context: "Failed to generate content from image.",
            details: "no file uploaded in field 'image'".into(),
            status: StatusCode::BAD_REQUEST,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
