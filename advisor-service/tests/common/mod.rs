use advisor_service::config::{
    AdvisorConfig, HuggingFaceConfig, MongoConfig, ObservabilityConfig, DEFAULT_HF_API_BASE,
    DEFAULT_HF_MODEL,
};
use advisor_service::services::{InMemoryAdvisorStore, MockBehavior, MockInferenceProvider};
use advisor_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemoryAdvisorStore>,
    pub provider: Arc<MockInferenceProvider>,
    pub client: reqwest::Client,
}

pub fn test_config() -> AdvisorConfig {
    AdvisorConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            ..CoreConfig::default()
        },
        mongodb: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: format!("advisor_test_{}", uuid::Uuid::new_v4()),
        },
        huggingface: HuggingFaceConfig {
            api_key: Some(Secret::new("hf_test".to_string())),
            model: DEFAULT_HF_MODEL.to_string(),
            api_base: DEFAULT_HF_API_BASE.to_string(),
        },
        observability: ObservabilityConfig {
            otlp_endpoint: None,
        },
    }
}

impl TestApp {
    pub async fn spawn(behavior: MockBehavior) -> Self {
        Self::spawn_with_provider(MockInferenceProvider::new(behavior)).await
    }

    pub async fn spawn_with_provider(provider: MockInferenceProvider) -> Self {
        let store = Arc::new(InMemoryAdvisorStore::new());
        let provider = Arc::new(provider);

        let app = Application::build_with(test_config(), store.clone(), provider.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            provider,
            client,
        }
    }

    pub async fn post_chat(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/chat", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_status(&self, client_name: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/status", self.address))
            .json(&serde_json::json!({ "client_name": client_name }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn chat_body(name: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "message": message,
        "user_info": {
            "name": name,
            "email": "holder@example.com",
            "phone": "+1 555 0100"
        }
    })
}
