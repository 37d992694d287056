#![deny(missing_docs)]

//! An HTTP gateway in front of the Google Gemini AI API.
//!
//! Text prompts and uploaded images, documents and audio are turned into
//! `generateContent` requests; the generated text is relayed back as JSON.
//! The bundled Gemini client handles request construction, file uploads and
//! response parsing.

pub mod client;
pub mod config;
pub mod error;
pub mod file;
pub mod models;
pub mod server;
pub mod upload;

pub use client::GenerativeModel;
pub use config::Config;
pub use file::GoogleAIFileManager;
pub use server::{router, AppState};
