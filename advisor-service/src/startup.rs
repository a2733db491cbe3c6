//! Application startup and lifecycle management.
//!
//! `Application::build` connects MongoDB, wires the inference provider into
//! the chat advisor and binds the listener. `run_until_stopped` serves until a
//! shutdown signal arrives and then closes the store.

use crate::config::AdvisorConfig;
use crate::handlers;
use crate::services::{
    AdvisorDb, AdvisorStore, ChatAdvisor, HuggingFaceProvider, InferenceProvider,
};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AdvisorStore>,
    pub advisor: ChatAdvisor,
}

pub fn build_router(state: AppState) -> Router {
    // Root is served with and without the trailing slash.
    let api_routes = Router::new()
        .route("/api", get(handlers::root))
        .route("/api/", get(handlers::root))
        .route(
            "/api/status",
            get(handlers::list_status_checks).post(handlers::create_status_check),
        )
        .route("/api/chat", post(handlers::chat));

    let ops_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint));

    Router::new()
        .merge(api_routes)
        .merge(ops_routes)
        .fallback(handlers::not_found)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: AdvisorConfig) -> Result<Self, AppError> {
        let db = AdvisorDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        db.health_check().await.map_err(|e| {
            tracing::error!("MongoDB is not reachable: {}", e);
            e
        })?;

        let provider = HuggingFaceProvider::new(config.huggingface.clone());
        if provider.is_configured() {
            tracing::info!(
                model = %config.huggingface.model,
                endpoint = %provider.endpoint(),
                "Initialized Hugging Face inference provider"
            );
        } else {
            tracing::warn!("HF_API_KEY is not set; chat requests will be rejected");
        }

        Self::build_with(config, Arc::new(db), Arc::new(provider)).await
    }

    /// Build the application around an existing store and provider.
    pub async fn build_with(
        config: AdvisorConfig,
        store: Arc<dyn AdvisorStore>,
        provider: Arc<dyn InferenceProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            advisor: ChatAdvisor::new(store.clone(), provider),
            store,
        };

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Advisor service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let store = self.state.store.clone();
        let router = build_router(self.state);

        let result = axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        store.shutdown().await;

        if let Err(e) = &result {
            tracing::error!("HTTP server error: {}", e);
        }
        result
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
