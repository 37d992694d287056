//! Request models for the Gemini AI API.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::{GenerationConfig, Part};

/// The producer of a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Content written by the user.
    User,
    /// Content produced by the model.
    Model,
}

/// A content object containing parts of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Who produced this content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// The parts that make up the content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Creates user content from a list of parts.
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some(Role::User),
            parts,
        }
    }
}

/// A request to the Gemini AI API.
#[derive(Debug, Clone, Serialize, TypedBuilder)]
#[builder(doc)]
pub struct Request {
    /// The contents of the request, including the prompt text.
    pub contents: Vec<Content>,
    /// Optional generation parameters; the model's defaults apply when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub generation_config: Option<GenerationConfig>,
}

impl Request {
    /// Creates a new request with the given text prompt.
    ///
    /// # Arguments
    ///
    /// * `text` - The text prompt to generate content from
    pub fn with_prompt(text: impl Into<String>) -> Self {
        Self::builder()
            .contents(vec![Content::user(vec![Part::text(text)])])
            .build()
    }

    /// Creates a single-turn user request made of a text prompt followed by one media part.
    ///
    /// # Arguments
    ///
    /// * `text` - The instruction for the model
    /// * `media` - An inline data or file data part
    pub fn with_prompt_and_media(text: impl Into<String>, media: Part) -> Self {
        Self::builder()
            .contents(vec![Content::user(vec![Part::text(text), media])])
            .build()
    }
}

impl From<&str> for Request {
    fn from(prompt: &str) -> Self {
        Self::with_prompt(prompt)
    }
}

impl From<String> for Request {
    fn from(prompt: String) -> Self {
        Self::with_prompt(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_request_is_a_single_user_turn() {
        let request = Request::with_prompt("Hello");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "contents": [{ "role": "user", "parts": [{ "text": "Hello" }] }] })
        );
    }

    #[test]
    fn media_follows_the_prompt() {
        let request =
            Request::with_prompt_and_media("Describe", Part::inline_data("audio/wav", "UklGRg=="));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0], json!({ "text": "Describe" }));
        assert_eq!(
            value["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            json!("audio/wav")
        );
        assert!(value.get("generation_config").is_none());
    }
}
