//! Route handlers for text prompts and uploaded media.

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{
    error::{ApiError, GenerationError},
    AppState,
};
use crate::{
    file::FileState,
    models::{Part, Request},
    upload::{read_multipart, UploadedFile},
};

/// Polling budget for files the Files API has not finished processing.
const FILE_PROCESSING_RETRIES: u32 = 10;
const FILE_PROCESSING_DELAY_MS: u64 = 500;

/// Body of `POST /generate-text`.
#[derive(Debug, Deserialize)]
pub struct GenerateTextRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Successful reply of every generation route.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Text produced by the model.
    pub output: String,
}

/// Reply of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Model every request is sent to.
    pub model: String,
}

/// Kind of media a route accepts, which decides how the file reaches the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Document,
    Audio,
}

impl MediaKind {
    /// Multipart field the file is expected under.
    pub fn field_name(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Document => "document",
            MediaKind::Audio => "audio",
        }
    }

    /// Prompt used when the request carries none.
    pub fn default_prompt(self) -> &'static str {
        match self {
            MediaKind::Image => "Describe this image.",
            MediaKind::Document => "Describe this uploaded document.",
            MediaKind::Audio => "Describe this uploaded audio.",
        }
    }

    /// `error` text of a failed request on this route.
    pub fn failure_message(self) -> &'static str {
        match self {
            MediaKind::Image => "Failed to generate content from image.",
            MediaKind::Document => "Failed to generate content from document.",
            MediaKind::Audio => "Failed to generate content from audio.",
        }
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.model.model().to_string(),
    })
}

/// `POST /generate-text`: JSON prompt in, generated text out.
pub async fn generate_text(
    State(state): State<AppState>,
    payload: Result<Json<GenerateTextRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let prompt = req
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("prompt is required".to_string()))?;

    let output = state
        .model
        .send_message(prompt)
        .await
        .and_then(|response| response.output_text())
        .inspect_err(|e| error!(error = %e, "text generation failed"))?;

    Ok(Json(GenerateResponse { output }))
}

/// `POST /generate-from-image`: the image is uploaded to the Files API and referenced by URI.
pub async fn generate_from_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    generate_from_upload(&state, multipart, MediaKind::Image).await
}

/// `POST /generate-from-document`: the document is sent inline as base64.
pub async fn generate_from_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    generate_from_upload(&state, multipart, MediaKind::Document).await
}

/// `POST /generate-from-audio`: the audio is sent inline as base64.
pub async fn generate_from_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    generate_from_upload(&state, multipart, MediaKind::Audio).await
}

/// Reads the upload, calls the model and removes the temporary file whatever the outcome.
async fn generate_from_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
    kind: MediaKind,
) -> Result<Json<GenerateResponse>, ApiError> {
    let context = kind.failure_message();
    let mut multipart = multipart.map_err(|e| ApiError::InvalidUpload {
        context,
        status: e.status(),
        details: e.body_text(),
    })?;

    let upload = read_multipart(&mut multipart, kind.field_name(), &state.config.upload_dir)
        .await
        .map_err(|e| ApiError::from_upload(context, e))?;

    let prompt = upload
        .prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| kind.default_prompt().to_string());
    let file = upload.file.ok_or_else(|| ApiError::InvalidUpload {
        context,
        status: StatusCode::BAD_REQUEST,
        details: format!("no file uploaded in field '{}'", kind.field_name()),
    })?;

    let result = generate_with_file(state, &file, prompt, kind).await;
    file.cleanup();

    match result {
        Ok(output) => Ok(Json(GenerateResponse { output })),
        Err(source) => {
            error!(media = kind.field_name(), error = %source, "{}", context);
            Err(ApiError::Generation { context, source })
        }
    }
}

async fn generate_with_file(
    state: &AppState,
    file: &UploadedFile,
    prompt: String,
    kind: MediaKind,
) -> Result<String, GenerationError> {
    let media = match kind {
        MediaKind::Image => {
            let mut uploaded = state
                .files
                .upload_file(
                    file.path(),
                    Some(file.mime_type()),
                    file.original_name().map(str::to_string),
                )
                .await?;
            if uploaded.state == FileState::Processing {
                uploaded = state
                    .files
                    .wait_for_file_processing(
                        &uploaded.name,
                        FILE_PROCESSING_RETRIES,
                        FILE_PROCESSING_DELAY_MS,
                    )
                    .await?;
            }
            info!(name = %uploaded.name, uri = %uploaded.uri, "image uploaded to Files API");
            Part::file_data(uploaded.mime_type, uploaded.uri)
        }
        MediaKind::Document | MediaKind::Audio => {
            Part::inline_data(file.mime_type(), file.read_base64().await?)
        }
    };

    let response = state
        .model
        .generate_response(Request::with_prompt_and_media(prompt, media))
        .await?;
    Ok(response.output_text()?)
}
