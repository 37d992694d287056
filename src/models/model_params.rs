use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Configuration parameters for the generative model
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct ModelParams {
    /// Model identifier (e.g., "gemini-2.0-flash")
    #[builder(setter(into), default = String::from("gemini-2.0-flash"))]
    pub model: String,
    /// Generation parameters applied to requests that do not carry their own
    #[builder(default, setter(strip_option))]
    pub generation_config: Option<GenerationConfig>,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<&str> for ModelParams {
    fn from(model: &str) -> Self {
        Self::builder().model(model).build()
    }
}

/// Sampling parameters sent with a generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Controls randomness of the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Upper bound on the number of generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i32>,
}

impl GenerationConfig {
    /// Returns `None` when no parameter is set, so the request omits the block entirely.
    pub fn into_option(self) -> Option<Self> {
        (self != Self::default()).then_some(self)
    }
}
