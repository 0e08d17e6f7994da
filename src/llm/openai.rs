use crate::llm::client::{GenerationOptions, LLMClient, ResponseSchema};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Client for the OpenAI chat-completions wire format.
pub struct OpenAIClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAIClient {
    pub fn new(
        api_key: Option<String>,
        api_base: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
        })
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage<'_>>,
        options: GenerationOptions,
        response_format: Option<Value>,
    ) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            response_format,
        };

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Chat completion request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status, &text));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Malformed chat completion body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::Transport("Empty response from model".to_string()))
    }
}

/// Map a non-success response to an error; quota exhaustion counts as rate limiting.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> AppError {
    let lower = body.to_ascii_lowercase();
    let quota = ["resource_exhausted", "quota", "rate limit", "too many requests"]
        .iter()
        .any(|needle| lower.contains(needle));

    if status == StatusCode::TOO_MANY_REQUESTS || quota {
        AppError::RateLimited(format!("status {}: {}", status.as_u16(), body))
    } else {
        AppError::Transport(format!("status {}: {}", status.as_u16(), body))
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_with_system(
        &self,
        system: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String> {
        let messages = vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ];
        self.complete(messages, options, None).await
    }

    async fn generate_with_history(
        &self,
        system: &str,
        messages: &[(String, String)],
        options: GenerationOptions,
    ) -> Result<String> {
        let mut chat = Vec::with_capacity(messages.len() + 1);
        chat.push(ChatMessage {
            role: "system",
            content: system,
        });
        chat.extend(messages.iter().map(|(role, content)| ChatMessage {
            role: match role.as_str() {
                "assistant" => "assistant",
                _ => "user",
            },
            content,
        }));
        self.complete(chat, options, None).await
    }

    async fn generate_structured(
        &self,
        system: &str,
        prompt: &str,
        schema: &ResponseSchema,
        options: GenerationOptions,
    ) -> Result<String> {
        let messages = vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ];
        let format = json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "schema": schema.schema,
            }
        });
        self.complete(messages, options, Some(format)).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
