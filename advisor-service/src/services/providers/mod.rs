//! Inference provider abstraction and implementations.
//!
//! The chat flow talks to a hosted text-generation model through the
//! [`InferenceProvider`] trait so the Hugging Face client can be swapped for a
//! mock in tests.

pub mod huggingface;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use huggingface::HuggingFaceProvider;
pub use mock::{MockBehavior, MockInferenceProvider};

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Generation parameters sent alongside the prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub return_full_text: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 200,
            temperature: 0.7,
            return_full_text: false,
        }
    }
}

/// One element of the text-generation response array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}

/// Trait for hosted text-generation backends.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Whether credentials are present. Checked before any request is made.
    fn is_configured(&self) -> bool;

    /// Model identifier, for logs and metrics.
    fn model(&self) -> &str;

    /// Run one generation. An `Ok` with an empty vector means the backend
    /// answered successfully but produced nothing.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<GeneratedText>, ProviderError>;
}
