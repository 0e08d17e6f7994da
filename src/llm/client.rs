//! LLM client abstraction and provider selection
//!
//! Everything above this layer talks to a [`LLMClient`]; only the provider
//! module knows about wire formats.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Sampling knobs for a single request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationOptions {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::new(1000, 0.7)
    }
}

/// A named JSON schema the model is asked to conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: Value,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Derive the schema from a `schemars::JsonSchema` type.
    pub fn of<T: schemars::JsonSchema>(name: impl Into<String>) -> Self {
        let schema = schemars::schema_for!(T);
        Self::new(name, serde_json::to_value(schema).unwrap_or(Value::Null))
    }
}

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate with system prompt
    async fn generate_with_system(
        &self,
        system: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String>;

    /// Generate with conversation history as (role, content) pairs
    async fn generate_with_history(
        &self,
        system: &str,
        messages: &[(String, String)],
        options: GenerationOptions,
    ) -> Result<String>;

    /// Generate a JSON document constrained by `schema`.
    ///
    /// The raw text is returned; callers parse and validate it.
    async fn generate_structured(
        &self,
        system: &str,
        prompt: &str,
        schema: &ResponseSchema,
        options: GenerationOptions,
    ) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// Any hosted OpenAI-compatible chat-completions endpoint
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::ChatCompletions {
    ///     api_key: "ak-...".to_string(),
    ///     api_base: "https://ark.cn-beijing.volces.com/api/v3".to_string(),
    ///     model: "doubao-pro-32k".to_string(),
    ///     timeout: Duration::from_secs(60),
    /// };
    /// ```
    ChatCompletions {
        api_key: String,
        api_base: String,
        model: String,
        timeout: Duration,
    },

    /// Local Ollama server through its OpenAI-compatible `/v1` endpoint.
    /// No credentials are sent.
    Ollama {
        base_url: String,
        model: String,
        timeout: Duration,
    },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when a hosted provider has no API key or
    /// the HTTP client cannot be built.
    pub fn create_client(&self) -> Result<Arc<dyn LLMClient>> {
        match self {
            Provider::ChatCompletions {
                api_key,
                api_base,
                model,
                timeout,
            } => {
                if api_key.trim().is_empty() {
                    return Err(AppError::Config(format!(
                        "no API key configured for model '{}'",
                        model
                    )));
                }
                Ok(Arc::new(super::openai::OpenAIClient::new(
                    Some(api_key.clone()),
                    api_base.clone(),
                    model.clone(),
                    *timeout,
                )?))
            }
            Provider::Ollama {
                base_url,
                model,
                timeout,
            } => Ok(Arc::new(super::openai::OpenAIClient::new(
                None,
                format!("{}/v1", base_url.trim_end_matches('/')),
                model.clone(),
                *timeout,
            )?)),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::ChatCompletions { .. } => "ChatCompletions",
            Provider::Ollama { .. } => "Ollama",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let hosted = Provider::ChatCompletions {
            api_key: "k".to_string(),
            api_base: "https://example.invalid/v3".to_string(),
            model: "doubao-pro-32k".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(hosted.name(), "ChatCompletions");

        let local = Provider::Ollama {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(local.name(), "Ollama");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let provider = Provider::ChatCompletions {
            api_key: "  ".to_string(),
            api_base: "https://example.invalid/v3".to_string(),
            model: "doubao-pro-32k".to_string(),
            timeout: Duration::from_secs(5),
        };
        let err = match provider.create_client() {
            Ok(_) => panic!("Expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("doubao-pro-32k"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let provider = Provider::Ollama {
            base_url: "http://localhost:11434/".to_string(),
            model: "llama3.2".to_string(),
            timeout: Duration::from_secs(5),
        };
        let client = provider.create_client().unwrap();
        assert_eq!(client.model_name(), "llama3.2");
    }

    #[test]
    fn test_schema_from_type() {
        #[derive(schemars::JsonSchema)]
        #[allow(dead_code)]
        struct Sample {
            name: String,
        }
        let schema = ResponseSchema::of::<Sample>("sample");
        assert_eq!(schema.name, "sample");
        assert!(schema.schema["properties"]["name"].is_object());
    }
}
