//! Response models for the Gemini AI API.

use serde::Deserialize;

use super::{Content, Part};
use crate::error::GoogleGenerativeAIError;

/// A response from the Gemini AI API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// The generated candidates from the model.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Metadata about token usage.
    pub usage_metadata: Option<UsageMetadata>,
    /// The version of the model used.
    pub model_version: Option<String>,
    /// Feedback about the prompt, present when the prompt was blocked.
    pub prompt_feedback: Option<PromptFeedback>,
}

impl Response {
    /// Gets the concatenated text parts of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .filter_map(Part::as_text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Gets the generated text, failing when the model returned none.
    ///
    /// # Errors
    ///
    /// Returns an error naming the block or finish reason when the response
    /// carries no text at all.
    pub fn output_text(&self) -> Result<String, GoogleGenerativeAIError> {
        let has_text = self
            .candidates
            .first()
            .is_some_and(|c| c.content.parts.iter().any(|p| p.as_text().is_some()));
        if has_text {
            return Ok(self.text());
        }

        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(GoogleGenerativeAIError::new(format!(
                "Prompt was blocked (block reason: {reason})"
            )));
        }

        let finish_reason = self
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_ref())
            .map(|r| format!("{r:?}"))
            .unwrap_or_else(|| "none".to_string());
        Err(GoogleGenerativeAIError::new(format!(
            "No text in model response (finish reason: {finish_reason})"
        )))
    }
}

/// A candidate response from the model.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The content of the candidate response.
    #[serde(default)]
    pub content: Content,
    /// The reason why the generation finished.
    pub finish_reason: Option<FinishReason>,
    /// Average log probabilities for the generation.
    pub avg_logprobs: Option<f64>,
}

/// Reason why the generation finished.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    #[serde(rename = "FINISH_REASON_UNSPECIFIED")]
    /// Default value. This value is unused.
    Unspecified,
    /// Natural stop point of the model or provided stop sequence.
    Stop,
    /// The maximum number of tokens as specified in the request was reached.
    MaxTokens,
    /// The response candidate content was flagged for safety reasons.
    Safety,
    /// The response candidate content was flagged for recitation reasons.
    Recitation,
    /// The response candidate content was flagged for using an unsupported language.
    Language,
    /// Unknown reason.
    Other,
    /// Token generation stopped because the content contains forbidden terms.
    Blocklist,
    /// Token generation stopped for potentially containing prohibited content.
    ProhibitedContent,
    /// Token generation stopped because the content potentially contains Sensitive Personally Identifiable Information (SPII).
    Spii,
    /// The function call generated by the model is invalid.
    MalformedFunctionCall,
    /// A reason introduced by the API after this crate was written.
    #[serde(other)]
    Unrecognized,
}

/// Feedback about the prompt itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was blocked, e.g. `SAFETY`.
    pub block_reason: Option<String>,
}

/// Metadata about token usage in the request and response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Number of tokens in the prompt.
    pub prompt_token_count: Option<i32>,
    /// Number of tokens in the generated candidates.
    pub candidates_token_count: Option<i32>,
    /// Total number of tokens used.
    pub total_token_count: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Response {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_joins_parts_of_the_first_candidate() {
        let response = parse(json!({
            "candidates": [
                {
                    "content": { "role": "model", "parts": [{ "text": "Hello, " }, { "text": "world" }] },
                    "finishReason": "STOP"
                },
                { "content": { "role": "model", "parts": [{ "text": "ignored" }] } }
            ],
            "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5 },
            "modelVersion": "gemini-2.0-flash"
        }));

        assert_eq!(response.output_text().unwrap(), "Hello, world");
        assert_eq!(response.candidates[0].finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage_metadata.unwrap().total_token_count, Some(5));
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let response = parse(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        assert_eq!(response.text(), "");
        let err = response.output_text().unwrap_err();
        assert!(err.to_string().contains("block reason: SAFETY"), "{err}");
    }

    #[test]
    fn candidate_without_content_reports_finish_reason() {
        let response = parse(json!({ "candidates": [{ "finishReason": "RECITATION" }] }));
        let err = response.output_text().unwrap_err();
        assert!(err.to_string().contains("Recitation"), "{err}");
    }

    #[test]
    fn unknown_finish_reason_still_parses() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [{ "text": "ok" }] }, "finishReason": "IMAGE_SAFETY" }]
        }));
        assert_eq!(
            response.candidates[0].finish_reason,
            Some(FinishReason::Unrecognized)
        );
    }
}
