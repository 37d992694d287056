//! File upload support for the Gemini AI API.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::client::{DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use crate::error::api_error_message;

/// Represents possible errors that can occur during file operations.
#[derive(Error, Debug)]
pub enum FileError {
    /// Error occurred during HTTP request.
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Failed to get file size from the filesystem.
    #[error("Failed to get file size: {0}")]
    FileSizeError(io::Error),
    /// Failed to read file contents.
    #[error("Failed to read file: {0}")]
    FileReadError(io::Error),
    /// Failed to determine MIME type for the file.
    #[error("Invalid MIME type: {0}")]
    MimeTypeError(String),
    /// Error occurred during file upload process.
    #[error("Upload failed: {0}")]
    UploadError(String),
    /// Invalid file ID provided.
    #[error("Invalid file ID: {0}")]
    InvalidFileId(String),
    /// Error occurred during file processing.
    #[error("File processing error: {0}")]
    ProcessingError(String),
}

/// Information about a file stored in the Gemini AI system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Unique identifier for the file, e.g. `files/abc-123`.
    pub name: String,
    /// Optional display name for the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// MIME type of the file content.
    pub mime_type: String,
    /// Size of the file in bytes as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<String>,
    /// Optional expiration time for the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<String>,
    /// URI that can be used to reference this file in API calls.
    pub uri: String,
    /// Current processing state of the file.
    #[serde(default)]
    pub state: FileState,
}

/// Represents the processing state of a file in the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileState {
    /// State is not specified.
    #[default]
    #[serde(rename = "STATE_UNSPECIFIED")]
    Unspecified,
    /// File is currently being processed.
    Processing,
    /// File is processed and ready for use.
    Active,
    /// An error occurred during file processing.
    Failed,
}

impl std::fmt::Display for FileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileState::Unspecified => write!(f, "Unspecified"),
            FileState::Processing => write!(f, "Processing"),
            FileState::Active => write!(f, "Active"),
            FileState::Failed => write!(f, "Failed"),
        }
    }
}

/// Manager for handling file operations with the Gemini AI API.
#[derive(Debug, Clone)]
pub struct GoogleAIFileManager {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    api_version: String,
}

impl GoogleAIFileManager {
    /// Creates a new instance of the Google AI File Manager.
    ///
    /// # Example
    ///
    /// ```
    /// use gemini_gateway::file::GoogleAIFileManager;
    ///
    /// let file_manager = GoogleAIFileManager::new("your-api-key-here");
    /// ```
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Points the manager at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the API version path segment.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Uploads a file to the Gemini AI system using the resumable upload protocol.
    ///
    /// # Arguments
    /// * `file_path` - Path to the file to upload
    /// * `mime_type` - MIME type of the content; guessed from the path when `None`
    /// * `display_name` - Optional display name for the file
    ///
    /// # Returns
    /// Information about the uploaded file.
    pub async fn upload_file<A: AsRef<Path>>(
        &self,
        file_path: A,
        mime_type: Option<&str>,
        display_name: Option<String>,
    ) -> Result<FileInfo, FileError> {
        let file_path = file_path.as_ref();
        let file_size = tokio::fs::metadata(file_path)
            .await
            .map_err(FileError::FileSizeError)?
            .len();

        let mime_type = match mime_type {
            Some(mime) => mime.to_string(),
            None => mime_guess::from_path(file_path)
                .first()
                .ok_or_else(|| {
                    FileError::MimeTypeError(format!("Unknown MIME type for {:?}", file_path))
                })?
                .to_string(),
        };

        let display_name = display_name.unwrap_or_else(|| {
            file_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unnamed")
                .to_string()
        });
        let metadata = serde_json::json!({ "file": { "display_name": display_name } });

        let start_url = format!("{}/upload/{}/files", self.base_url, self.api_version);
        let response = self
            .client
            .post(&start_url)
            .query(&[("key", &self.api_key)])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", file_size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type.as_str())
            .json(&metadata)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FileError::UploadError(format!(
                "start request failed with status {}: {}",
                status,
                api_error_message(&body)
            )));
        }

        let session_url = response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| FileError::UploadError("Missing upload URL".into()))?
            .to_string();

        let file_content = tokio::fs::read(file_path)
            .await
            .map_err(FileError::FileReadError)?;

        let response = self
            .client
            .post(&session_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(file_content)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        if !status.is_success() {
            return Err(FileError::UploadError(format!(
                "finalize request failed with status {}: {}",
                status,
                api_error_message(&response_text)
            )));
        }

        #[derive(Deserialize)]
        struct FileResponse {
            file: FileInfo,
        }

        let file_response: FileResponse = serde_json::from_str(&response_text).map_err(|e| {
            FileError::UploadError(format!(
                "Failed to parse response: {}. Response: {}",
                e, response_text
            ))
        })?;
        debug!(
            name = %file_response.file.name,
            state = %file_response.file.state,
            size = file_size,
            "file uploaded"
        );
        Ok(file_response.file)
    }

    /// Retrieves information about a file by its name.
    pub async fn get_file(&self, name: &str) -> Result<FileInfo, FileError> {
        let url = format!(
            "{}/{}/files/{}",
            self.base_url,
            self.api_version,
            parse_file_id(name)?
        );
        let response = self
            .client
            .get(&url)
            .query(&[("key", &self.api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FileError::ProcessingError(format!(
                "lookup of {} failed with status {}: {}",
                name,
                status,
                api_error_message(&body)
            )));
        }

        Ok(response.json().await?)
    }

    /// Waits for a file to finish processing, with configurable retries and delay.
    ///
    /// # Arguments
    /// * `name` - Name of the file to wait for
    /// * `max_retries` - Maximum number of times to check the file state
    /// * `delay_ms` - Delay in milliseconds between retries
    ///
    /// # Returns
    /// The file information once processing is complete or an error if processing fails.
    pub async fn wait_for_file_processing(
        &self,
        name: &str,
        max_retries: u32,
        delay_ms: u64,
    ) -> Result<FileInfo, FileError> {
        for _ in 0..max_retries {
            let file_info = self.get_file(name).await?;
            match file_info.state {
                FileState::Active => return Ok(file_info),
                FileState::Failed => {
                    return Err(FileError::ProcessingError(format!(
                        "File {} processing failed",
                        name
                    )))
                }
                FileState::Processing | FileState::Unspecified => {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
        Err(FileError::ProcessingError(format!(
            "Timeout waiting for file {} to process",
            name
        )))
    }

    /// Deletes a file from the system.
    pub async fn delete_file(&self, name: &str) -> Result<(), FileError> {
        let url = format!(
            "{}/{}/files/{}",
            self.base_url,
            self.api_version,
            parse_file_id(name)?
        );
        let response = self
            .client
            .delete(&url)
            .query(&[("key", &self.api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FileError::ProcessingError(format!(
                "deletion of {} failed with status {}: {}",
                name,
                status,
                api_error_message(&body)
            )));
        }

        debug!(name, "file deleted");
        Ok(())
    }
}

fn parse_file_id(file_id: &str) -> Result<&str, FileError> {
    if let Some(stripped) = file_id.strip_prefix("files/") {
        Ok(stripped)
    } else if !file_id.is_empty() {
        Ok(file_id)
    } else {
        Err(FileError::InvalidFileId(
            "File ID must not be empty".to_string(),
        ))
    }
}
