//! Client implementation for the Gemini AI API.

use tracing::debug;

use crate::{
    error::{api_error_message, GoogleGenerativeAIError},
    models::{ModelParams, Request, RequestType, Response},
};

/// Default API endpoint for Google's Generative AI service
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default API version
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// A client for interacting with the Gemini AI API.
#[derive(Debug, Clone)]
pub struct GenerativeModel {
    api_key: String,
    params: ModelParams,
    client: reqwest::Client,
    base_url: String,
    api_version: String,
}

impl GenerativeModel {
    /// Creates a new GenerativeModel with the specified API key and model.
    ///
    /// # Arguments
    ///
    /// * `api_key` - The API key for authentication
    /// * `params` - The model parameters
    pub fn new(api_key: impl Into<String>, params: impl Into<ModelParams>) -> Self {
        Self {
            api_key: api_key.into(),
            params: params.into(),
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Points the client at a different API host, e.g. a regional endpoint or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the API version path segment.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Returns the model identifier requests are sent to.
    pub fn model(&self) -> &str {
        &self.params.model
    }

    /// Makes a request to the Gemini AI API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or answers with a non-success status.
    async fn make_request(
        &self,
        url: &str,
        mut request: Request,
    ) -> Result<reqwest::Response, GoogleGenerativeAIError> {
        request.generation_config = request
            .generation_config
            .or_else(|| self.params.generation_config.clone());

        let response = self
            .client
            .post(url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GoogleGenerativeAIError::Api {
                status: status.as_u16(),
                message: api_error_message(&error_body),
            });
        }

        Ok(response)
    }

    fn build_url(&self, request_type: RequestType) -> String {
        format!(
            "{}/{}/models/{}:{}",
            self.base_url, self.api_version, self.params.model, request_type
        )
    }

    /// Generates content from a plain text prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or if the response cannot be parsed.
    pub async fn send_message(
        &self,
        prompt: impl Into<String>,
    ) -> Result<Response, GoogleGenerativeAIError> {
        self.generate_response(Request::with_prompt(prompt)).await
    }

    /// Generates a response for a fully built request.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or if the response cannot be parsed.
    pub async fn generate_response(
        &self,
        request: impl Into<Request>,
    ) -> Result<Response, GoogleGenerativeAIError> {
        let url = self.build_url(RequestType::GenerateContent);
        debug!(model = %self.params.model, "sending generateContent request");
        let body = self.make_request(&url, request.into()).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_targets_the_configured_model() {
        let model = GenerativeModel::new("k", "gemini-2.0-flash").with_base_url("http://localhost:9/");
        assert_eq!(
            model.build_url(RequestType::GenerateContent),
            "http://localhost:9/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
