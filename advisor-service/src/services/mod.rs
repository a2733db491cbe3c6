pub mod advisor;
pub mod database;
pub mod metrics;
pub mod providers;

pub use advisor::{ChatAdvisor, ChatError, ChatOutcome};
pub use database::{AdvisorDb, AdvisorStore, InMemoryAdvisorStore, MAX_LIST_LIMIT};
pub use metrics::{get_metrics, init_metrics, record_chat_outcome};
pub use providers::{HuggingFaceProvider, InferenceProvider, MockBehavior, MockInferenceProvider};
