use axum::{extract::State, Json};
use validator::Validate;

use crate::dtos::{ChatRequest, ChatResponse};
use crate::services::{record_chat_outcome, ChatError};
use crate::startup::AppState;
use service_core::error::AppError;

#[tracing::instrument(skip(state, request))]
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    request.validate()?;

    // Run the turn on its own task so a client hanging up does not cancel
    // the writes or the model call halfway through.
    let advisor = state.advisor.clone();
    let turn = tokio::spawn(async move {
        advisor
            .chat(request.user_info.into(), request.message)
            .await
    });

    let result = turn.await.map_err(|e| {
        tracing::error!("Chat task failed: {}", e);
        AppError::InternalError(anyhow::anyhow!("Error processing chat: {}", e))
    })?;

    match result {
        Ok(outcome) => {
            record_chat_outcome(outcome.label());
            Ok(Json(outcome.into_response()))
        }
        Err(e) => {
            record_chat_outcome(e.label());
            match &e {
                ChatError::NotConfigured => tracing::error!("Chat rejected: {}", e),
                ChatError::Internal(source) => {
                    tracing::error!(error = %source, "Error in chat endpoint")
                }
            }
            Err(e.into())
        }
    }
}
