//! HTTP routes that relay prompts and uploads to the model.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{client::GenerativeModel, config::Config, file::GoogleAIFileManager, models::ModelParams};

mod error;
mod handlers;

pub use error::{ApiError, GenerationError};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Client for `generateContent`.
    pub model: GenerativeModel,
    /// Client for the Files API.
    pub files: GoogleAIFileManager,
    /// Settings the server was started with.
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds the API clients described by `config`.
    pub fn new(config: Config) -> Self {
        let params = ModelParams {
            model: config.model.clone(),
            generation_config: config.generation_config(),
        };

        let model = GenerativeModel::new(config.api_key.clone(), params)
            .with_base_url(config.base_url.clone())
            .with_api_version(config.api_version.clone());
        let files = GoogleAIFileManager::new(config.api_key.clone())
            .with_base_url(config.base_url.clone())
            .with_api_version(config.api_version.clone());

        Self {
            model,
            files,
            config: Arc::new(config),
        }
    }
}

/// Builds the gateway router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/generate-text", post(handlers::generate_text))
        .route("/generate-from-image", post(handlers::generate_from_image))
        .route("/generate-from-document", post(handlers::generate_from_document))
        .route("/generate-from-audio", post(handlers::generate_from_audio))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}
