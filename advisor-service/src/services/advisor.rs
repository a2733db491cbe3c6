//! Chat orchestration: persist the question, ask the model, persist the answer.
//!
//! Any inference failure is absorbed by a canned reply so the caller still
//! gets advice. Only a missing API key or a storage failure surfaces as an
//! error.

use crate::dtos::ChatResponse;
use crate::models::{AiResponseRecord, ChatMessageRecord, UserInfo};
use crate::services::providers::{
    GeneratedText, GenerationParams, InferenceProvider, ProviderError,
};
use crate::services::AdvisorStore;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;

/// Recommendations attached when the model call fails.
pub const FALLBACK_RECOMMENDATIONS: [&str; 3] = [
    "Use a hardware wallet (40% premium reduction)",
    "Enable 2FA on all accounts (15% reduction)",
    "Regular security audits (10% reduction)",
];

/// Recommendations attached whenever the model call succeeds, including when
/// it returned no text and the greeting is used instead.
pub const SUCCESS_RECOMMENDATIONS: [&str; 4] = [
    "Hardware wallet usage can reduce premiums by up to 40%",
    "Multi-factor authentication saves 15% on premiums",
    "Cold storage practices offer additional discounts",
    "Regular portfolio rebalancing towards stablecoins reduces risk",
];

/// Prompt sent to the model for one user question.
pub fn build_prompt(name: &str, message: &str) -> String {
    // Continuation lines carry an eight-space indent.
    format!(
        "You are a crypto insurance AI advisor helping users reduce their insurance premiums. \n        \
         The user {name} is asking: {message}\n        \
         \n        \
         Provide helpful advice about:\n        \
         1. Security best practices that can reduce premium costs\n        \
         2. Risk assessment for their crypto holdings\n        \
         3. Insurance coverage recommendations\n        \
         4. Specific actionable steps to lower their risk profile\n        \
         \n        \
         Keep responses concise and actionable. Focus on premium reduction strategies."
    )
}

/// Reply used when the model call fails or its body is unusable.
pub fn fallback_reply(name: &str, message: &str) -> String {
    format!(
        "Hello {name}! I'm here to help you reduce your crypto insurance premiums. \
         Based on your question about '{message}', I recommend focusing on improving \
         your security setup. Would you like specific advice on hardware wallets, \
         2FA setup, or DeFi risk management?"
    )
}

/// Reply used when the model call succeeds but returns no generations.
pub fn greeting_reply(name: &str) -> String {
    format!(
        "Hello {name}! I'm here to help you lower your premium costs. \
         What specific crypto security concerns do you have?"
    )
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Successful result of a chat turn.
#[derive(Debug)]
pub enum ChatOutcome {
    /// The model answered (possibly with nothing, in which case the greeting
    /// stands in for its text).
    Generated(ChatResponse),
    /// The model call failed and canned advice was returned.
    Fallback {
        response: ChatResponse,
        reason: ProviderError,
    },
}

impl ChatOutcome {
    pub fn response(&self) -> &ChatResponse {
        match self {
            ChatOutcome::Generated(response) => response,
            ChatOutcome::Fallback { response, .. } => response,
        }
    }

    pub fn into_response(self) -> ChatResponse {
        match self {
            ChatOutcome::Generated(response) => response,
            ChatOutcome::Fallback { response, .. } => response,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChatOutcome::Generated(_) => "generated",
            ChatOutcome::Fallback { .. } => "fallback",
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Hugging Face API key not configured")]
    NotConfigured,

    #[error("Error processing chat: {0}")]
    Internal(#[source] AppError),
}

impl ChatError {
    pub fn label(&self) -> &'static str {
        match self {
            ChatError::NotConfigured => "not_configured",
            ChatError::Internal(_) => "error",
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::NotConfigured => AppError::ConfigError(anyhow::anyhow!("{}", err)),
            ChatError::Internal(_) => AppError::InternalError(anyhow::anyhow!("{}", err)),
        }
    }
}

/// Runs one chat turn against a store and an inference provider.
#[derive(Clone)]
pub struct ChatAdvisor {
    store: Arc<dyn AdvisorStore>,
    provider: Arc<dyn InferenceProvider>,
    params: GenerationParams,
}

impl ChatAdvisor {
    pub fn new(store: Arc<dyn AdvisorStore>, provider: Arc<dyn InferenceProvider>) -> Self {
        Self {
            store,
            provider,
            params: GenerationParams::default(),
        }
    }

    /// Handle one message.
    ///
    /// Order within a turn is fixed: credential check, message write, model
    /// call, response write. A failed response write leaves the message
    /// record in place.
    pub async fn chat(
        &self,
        user_info: UserInfo,
        message: String,
    ) -> Result<ChatOutcome, ChatError> {
        if !self.provider.is_configured() {
            return Err(ChatError::NotConfigured);
        }

        let inbound = ChatMessageRecord::new(user_info, message);
        self.store
            .insert_chat_message(&inbound)
            .await
            .map_err(ChatError::Internal)?;

        let name = inbound.user_info.name.as_str();
        let prompt = build_prompt(name, &inbound.message);

        let outcome = match self.provider.generate(&prompt, &self.params).await {
            Ok(generations) => ChatOutcome::Generated(success_response(name, generations)),
            Err(reason) => {
                tracing::warn!(
                    model = %self.provider.model(),
                    message_id = %inbound.id,
                    error = %reason,
                    "Inference call failed, using fallback advice"
                );
                ChatOutcome::Fallback {
                    response: ChatResponse {
                        response: fallback_reply(name, &inbound.message),
                        recommendations: to_strings(&FALLBACK_RECOMMENDATIONS),
                    },
                    reason,
                }
            }
        };

        let reply = outcome.response();
        let record = AiResponseRecord::new(
            inbound.id.clone(),
            reply.response.clone(),
            reply.recommendations.clone(),
        );
        self.store
            .insert_ai_response(&record)
            .await
            .map_err(ChatError::Internal)?;

        tracing::info!(
            message_id = %inbound.id,
            response_id = %record.id,
            outcome = outcome.label(),
            "Chat turn completed"
        );

        Ok(outcome)
    }
}

fn success_response(name: &str, generations: Vec<GeneratedText>) -> ChatResponse {
    let response = generations
        .into_iter()
        .next()
        .map(|g| g.generated_text)
        .unwrap_or_else(|| greeting_reply(name));

    ChatResponse {
        response,
        recommendations: to_strings(&SUCCESS_RECOMMENDATIONS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{MockBehavior, MockInferenceProvider};
    use crate::services::InMemoryAdvisorStore;

    fn user() -> UserInfo {
        UserInfo {
            name: "Satoshi".to_string(),
            email: "satoshi@example.com".to_string(),
            phone: "+81 3 0000 0000".to_string(),
        }
    }

    fn advisor(
        behavior: MockBehavior,
    ) -> (ChatAdvisor, Arc<InMemoryAdvisorStore>, Arc<MockInferenceProvider>) {
        let store = Arc::new(InMemoryAdvisorStore::new());
        let provider = Arc::new(MockInferenceProvider::new(behavior));
        (
            ChatAdvisor::new(store.clone(), provider.clone()),
            store,
            provider,
        )
    }

    #[test]
    fn prompt_embeds_name_and_message_verbatim() {
        let prompt = build_prompt("Ada", "Is {cold} storage safe?");

        assert!(prompt.starts_with("You are a crypto insurance AI advisor"));
        assert!(prompt.contains("The user Ada is asking: Is {cold} storage safe?"));
        assert!(prompt.contains("4. Specific actionable steps to lower their risk profile"));
        assert!(prompt.ends_with("Focus on premium reduction strategies."));
    }

    #[test]
    fn prompt_layout_is_stable() {
        let expected = [
            "You are a crypto insurance AI advisor helping users reduce their insurance premiums. ",
            "        The user Ada is asking: hi",
            "        ",
            "        Provide helpful advice about:",
            "        1. Security best practices that can reduce premium costs",
            "        2. Risk assessment for their crypto holdings",
            "        3. Insurance coverage recommendations",
            "        4. Specific actionable steps to lower their risk profile",
            "        ",
            "        Keep responses concise and actionable. Focus on premium reduction strategies.",
        ]
        .join("\n");

        assert_eq!(build_prompt("Ada", "hi"), expected);
    }

    #[tokio::test]
    async fn generated_text_is_returned_with_success_list() {
        let (advisor, _, _) = advisor(MockBehavior::Respond(vec![
            "Move funds to cold storage.".to_string(),
            "ignored".to_string(),
        ]));

        let outcome = advisor.chat(user(), "How?".to_string()).await.unwrap();

        assert!(matches!(outcome, ChatOutcome::Generated(_)));
        let response = outcome.into_response();
        assert_eq!(response.response, "Move funds to cold storage.");
        assert_eq!(response.recommendations, to_strings(&SUCCESS_RECOMMENDATIONS));
    }

    #[tokio::test]
    async fn empty_generation_uses_greeting_with_success_list() {
        let (advisor, _, _) = advisor(MockBehavior::Respond(vec![]));

        let outcome = advisor.chat(user(), "Hi".to_string()).await.unwrap();

        assert!(matches!(outcome, ChatOutcome::Generated(_)));
        let response = outcome.into_response();
        assert_eq!(response.response, greeting_reply("Satoshi"));
        assert_eq!(response.recommendations.len(), 4);
        assert_eq!(response.recommendations, to_strings(&SUCCESS_RECOMMENDATIONS));
    }

    #[tokio::test]
    async fn api_error_falls_back_to_canned_advice() {
        let (advisor, _, provider) = advisor(MockBehavior::ApiError(503));

        let outcome = advisor
            .chat(user(), "Should I use a multisig?".to_string())
            .await
            .unwrap();

        assert_eq!(provider.calls(), 1);
        match outcome {
            ChatOutcome::Fallback { response, reason } => {
                assert!(matches!(reason, ProviderError::ApiError { status: 503, .. }));
                assert!(response.response.contains("Satoshi"));
                assert!(response.response.contains("Should I use a multisig?"));
                assert_eq!(
                    response.recommendations,
                    vec![
                        "Use a hardware wallet (40% premium reduction)",
                        "Enable 2FA on all accounts (15% reduction)",
                        "Regular security audits (10% reduction)",
                    ]
                );
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_body_falls_back_to_canned_advice() {
        let (advisor, _, _) = advisor(MockBehavior::Malformed);

        let outcome = advisor.chat(user(), "Hello".to_string()).await.unwrap();

        assert!(matches!(outcome, ChatOutcome::Fallback { .. }));
        assert_eq!(
            outcome.response().recommendations,
            to_strings(&FALLBACK_RECOMMENDATIONS)
        );
    }

    #[tokio::test]
    async fn missing_credential_stops_before_any_side_effect() {
        let store = Arc::new(InMemoryAdvisorStore::new());
        let provider = Arc::new(MockInferenceProvider::unconfigured());
        let advisor = ChatAdvisor::new(store.clone(), provider.clone());

        for _ in 0..3 {
            let err = advisor.chat(user(), "Hi".to_string()).await.unwrap_err();
            assert!(matches!(err, ChatError::NotConfigured));
        }

        assert_eq!(provider.calls(), 0);
        assert!(store.chat_messages().is_empty());
        assert!(store.ai_responses().is_empty());
    }

    #[tokio::test]
    async fn each_turn_writes_one_message_and_one_linked_response() {
        let (advisor, store, provider) = advisor(MockBehavior::Respond(vec!["ok".to_string()]));

        advisor.chat(user(), "first".to_string()).await.unwrap();
        advisor.chat(user(), "second".to_string()).await.unwrap();

        let messages = store.chat_messages();
        let responses = store.ai_responses();
        assert_eq!(messages.len(), 2);
        assert_eq!(responses.len(), 2);
        for (message, response) in messages.iter().zip(responses.iter()) {
            assert_eq!(response.user_id, message.id);
        }
        assert_eq!(messages[0].user_info, user());
        assert!(provider.prompts()[1].contains("asking: second"));
    }

    #[tokio::test]
    async fn message_write_failure_skips_model_call() {
        let (advisor, store, provider) = advisor(MockBehavior::Respond(vec!["ok".to_string()]));
        store.fail_chat_messages(true);

        let err = advisor.chat(user(), "Hi".to_string()).await.unwrap_err();

        assert!(matches!(err, ChatError::Internal(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn response_write_failure_keeps_message_record() {
        let (advisor, store, _) = advisor(MockBehavior::Respond(vec!["ok".to_string()]));
        store.fail_ai_responses(true);

        let err = advisor.chat(user(), "Hi".to_string()).await.unwrap_err();

        assert!(err.to_string().starts_with("Error processing chat: "));
        assert_eq!(store.chat_messages().len(), 1);
        assert!(store.ai_responses().is_empty());
    }

    #[test]
    fn chat_errors_map_to_server_errors() {
        let config: AppError = ChatError::NotConfigured.into();
        assert!(matches!(config, AppError::ConfigError(_)));
        assert_eq!(config.to_string(), "Configuration error: Hugging Face API key not configured");

        let internal: AppError =
            ChatError::Internal(AppError::DatabaseError(anyhow::anyhow!("disk full"))).into();
        assert_eq!(
            internal.to_string(),
            "Internal server error: Error processing chat: Database error: disk full"
        );
    }
}
