//! Persistence gateway for the advisor service.
//!
//! Three append-only MongoDB collections: `status_checks`, `chat_messages`
//! and `ai_responses`. Records are inserted and listed, never updated.

use crate::models::{AiResponseRecord, ChatMessageRecord, StatusCheck};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::FindOptions, Client as MongoClient, Collection, Database};
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Upper bound on records returned by a list call.
pub const MAX_LIST_LIMIT: i64 = 1000;

#[async_trait]
pub trait AdvisorStore: Send + Sync {
    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), AppError>;
    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError>;
    async fn insert_chat_message(&self, message: &ChatMessageRecord) -> Result<(), AppError>;
    async fn insert_ai_response(&self, response: &AiResponseRecord) -> Result<(), AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
    /// Release connections. Called once when the server stops.
    async fn shutdown(&self);
}

#[derive(Clone)]
pub struct AdvisorDb {
    client: MongoClient,
    db: Database,
}

impl AdvisorDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    // Collection accessors

    pub fn status_checks(&self) -> Collection<StatusCheck> {
        self.db.collection("status_checks")
    }

    pub fn chat_messages(&self) -> Collection<ChatMessageRecord> {
        self.db.collection("chat_messages")
    }

    pub fn ai_responses(&self) -> Collection<AiResponseRecord> {
        self.db.collection("ai_responses")
    }
}

#[async_trait]
impl AdvisorStore for AdvisorDb {
    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), AppError> {
        self.status_checks()
            .insert_one(check, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert status check: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError> {
        let options = FindOptions::builder()
            .limit(limit.clamp(1, MAX_LIST_LIMIT))
            .build();

        let cursor = self
            .status_checks()
            .find(None, options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query status checks: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect status checks: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })
    }

    async fn insert_chat_message(&self, message: &ChatMessageRecord) -> Result<(), AppError> {
        self.chat_messages()
            .insert_one(message, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert chat message: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    async fn insert_ai_response(&self, response: &AiResponseRecord) -> Result<(), AppError> {
        self.ai_responses()
            .insert_one(response, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert AI response: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    async fn shutdown(&self) {
        tracing::info!("Closing MongoDB client");
        self.client.clone().shutdown().await;
    }
}

/// In-process store used by tests and local runs without MongoDB.
#[derive(Default)]
pub struct InMemoryAdvisorStore {
    status_checks: Mutex<Vec<StatusCheck>>,
    chat_messages: Mutex<Vec<ChatMessageRecord>>,
    ai_responses: Mutex<Vec<AiResponseRecord>>,
    fail_chat_messages: AtomicBool,
    fail_ai_responses: AtomicBool,
}

impl InMemoryAdvisorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `insert_chat_message` calls fail.
    pub fn fail_chat_messages(&self, fail: bool) {
        self.fail_chat_messages.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `insert_ai_response` calls fail.
    pub fn fail_ai_responses(&self, fail: bool) {
        self.fail_ai_responses.store(fail, Ordering::SeqCst);
    }

    pub fn chat_messages(&self) -> Vec<ChatMessageRecord> {
        self.chat_messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn ai_responses(&self) -> Vec<AiResponseRecord> {
        self.ai_responses
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

fn push<T: Clone>(collection: &Mutex<Vec<T>>, name: &str, item: &T) -> Result<(), AppError> {
    collection
        .lock()
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("{} mutex poisoned: {}", name, e)))?
        .push(item.clone());
    Ok(())
}

#[async_trait]
impl AdvisorStore for InMemoryAdvisorStore {
    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), AppError> {
        push(&self.status_checks, "status_checks", check)
    }

    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT) as usize;
        let checks = self.status_checks.lock().map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("status_checks mutex poisoned: {}", e))
        })?;
        Ok(checks.iter().take(limit).cloned().collect())
    }

    async fn insert_chat_message(&self, message: &ChatMessageRecord) -> Result<(), AppError> {
        if self.fail_chat_messages.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "chat_messages write rejected"
            )));
        }
        push(&self.chat_messages, "chat_messages", message)
    }

    async fn insert_ai_response(&self, response: &AiResponseRecord) -> Result<(), AppError> {
        if self.fail_ai_responses.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "ai_responses write rejected"
            )));
        }
        push(&self.ai_responses, "ai_responses", response)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn shutdown(&self) {}
}
