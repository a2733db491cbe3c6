//! Mock inference provider for testing.

use super::{GeneratedText, GenerationParams, InferenceProvider, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What the mock returns from `generate`.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Succeed with these generated texts (possibly none).
    Respond(Vec<String>),
    /// Fail as if the API returned this status code.
    ApiError(u16),
    /// Fail as if the body did not have the expected shape.
    Malformed,
}

/// Mock provider that records every prompt it receives.
pub struct MockInferenceProvider {
    configured: bool,
    behavior: MockBehavior,
    latency: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockInferenceProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            configured: true,
            behavior,
            latency: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose credential is missing.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(MockBehavior::Respond(Vec::new()))
        }
    }

    /// Sleep this long inside every `generate` call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `generate` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InferenceProvider for MockInferenceProvider {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<Vec<GeneratedText>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if !self.configured {
            return Err(ProviderError::NotConfigured(
                "Mock inference provider not configured".to_string(),
            ));
        }

        match &self.behavior {
            MockBehavior::Respond(texts) => Ok(texts
                .iter()
                .map(|t| GeneratedText {
                    generated_text: t.clone(),
                })
                .collect()),
            MockBehavior::ApiError(status) => Err(ProviderError::ApiError {
                status: *status,
                body: "mock failure".to_string(),
            }),
            MockBehavior::Malformed => Err(ProviderError::MalformedResponse(
                "expected an array of generated_text objects".to_string(),
            )),
        }
    }
}
