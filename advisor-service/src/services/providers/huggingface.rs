//! Hugging Face Inference API provider.
//!
//! Posts `{inputs, parameters}` to `{api_base}/{model}` with bearer auth and
//! expects a JSON array of `{generated_text}` objects back. One attempt, no
//! timeout, no retry.

use super::{GeneratedText, GenerationParams, InferenceProvider, ProviderError};
use crate::config::HuggingFaceConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

/// Hugging Face text-generation client.
#[derive(Clone)]
pub struct HuggingFaceProvider {
    config: HuggingFaceConfig,
    endpoint: String,
    client: Client,
}

impl HuggingFaceProvider {
    pub fn new(config: HuggingFaceConfig) -> Self {
        let endpoint = config.endpoint();
        Self {
            config,
            endpoint,
            client: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferenceProvider for HuggingFaceProvider {
    fn is_configured(&self) -> bool {
        self.config.has_api_key()
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<GeneratedText>, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .filter(|_| self.config.has_api_key())
            .ok_or_else(|| ProviderError::NotConfigured("HF_API_KEY is not set".to_string()))?;

        let request = InferenceRequest {
            inputs: prompt,
            parameters: params,
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Hugging Face Inference API"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        first_generation(&body)
    }
}

/// Only the first element of the array is read; later elements are ignored
/// whatever their shape.
fn first_generation(body: &str) -> Result<Vec<GeneratedText>, ProviderError> {
    let items: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    let Some(first) = items.into_iter().next() else {
        return Ok(Vec::new());
    };

    let generation = serde_json::from_value::<GeneratedText>(first)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
    Ok(vec![generation])
}
