//! Error types for the Gemini AI client.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when using the Gemini AI client.
#[derive(Debug, Error)]
pub enum GoogleGenerativeAIError {
    /// Base error for the Gemini AI client.
    #[error("[GoogleGenerativeAI Error]: {message}")]
    Base {
        /// Error message
        message: String,
    },

    /// The API answered with a non-success status.
    #[error("Request failed with status {status}: {message}")]
    Api {
        /// HTTP status code returned by the API
        status: u16,
        /// Error message extracted from the response body
        message: String,
    },

    /// Error occurred during an API request.
    #[error("API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error occurred when parsing JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GoogleGenerativeAIError {
    /// Creates a new Base error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Base {
            message: message.into(),
        }
    }
}

/// Extracts `error.message` from a Google API error body, falling back to the raw body.
pub(crate) fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }

    #[derive(Deserialize)]
    struct Detail {
        message: String,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}
