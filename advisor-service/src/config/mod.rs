use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Hosted model used for advisor replies.
pub const DEFAULT_HF_MODEL: &str = "microsoft/DialoGPT-large";

/// Base URL of the Hugging Face Inference API; the model id is appended.
pub const DEFAULT_HF_API_BASE: &str = "https://api-inference.huggingface.co/models";

#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub huggingface: HuggingFaceConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HuggingFaceConfig {
    /// Bearer token. Absence does not stop startup; chat requests fail instead.
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub otlp_endpoint: Option<String>,
}

impl HuggingFaceConfig {
    /// True when a non-blank API key is present.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }

    /// Full inference endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), self.model)
    }
}

impl AdvisorConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(AdvisorConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGO_URL", None, is_prod)?,
                database: get_env("DB_NAME", None, is_prod)?,
            },
            huggingface: HuggingFaceConfig {
                api_key: env::var("HF_API_KEY").ok().map(Secret::new),
                model: env::var("HF_MODEL").unwrap_or_else(|_| DEFAULT_HF_MODEL.to_string()),
                api_base: env::var("HF_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_HF_API_BASE.to_string()),
            },
            observability: ObservabilityConfig {
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hf_config(api_key: Option<&str>) -> HuggingFaceConfig {
        HuggingFaceConfig {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
            model: DEFAULT_HF_MODEL.to_string(),
            api_base: DEFAULT_HF_API_BASE.to_string(),
        }
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        assert!(!hf_config(None).has_api_key());
        assert!(!hf_config(Some("")).has_api_key());
        assert!(!hf_config(Some("   ")).has_api_key());
        assert!(hf_config(Some("hf_test")).has_api_key());
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let mut config = hf_config(None);
        assert_eq!(
            config.endpoint(),
            "https://api-inference.huggingface.co/models/microsoft/DialoGPT-large"
        );

        config.api_base = "http://127.0.0.1:9000/models/".to_string();
        assert_eq!(
            config.endpoint(),
            "http://127.0.0.1:9000/models/microsoft/DialoGPT-large"
        );
    }

    #[test]
    fn missing_required_key_is_config_error() {
        let err = get_env("ADVISOR_TEST_SURELY_UNSET_KEY", None, false).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let value = get_env("ADVISOR_TEST_SURELY_UNSET_KEY", Some("fallback"), false)
            .expect("Default should apply outside prod");
        assert_eq!(value, "fallback");

        assert!(get_env("ADVISOR_TEST_SURELY_UNSET_KEY", Some("fallback"), true).is_err());
    }
}
