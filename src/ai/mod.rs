//! AI gateway
//!
//! Wraps the configured [`LLMClient`]s behind the four travel operations the
//! application needs. The sentinel methods on [`TravelAi`] never fail: advice
//! falls back to localized text and structured lookups resolve to `None`.
//! The `try_*` methods on [`AiGateway`] expose the typed cause.

pub mod prompts;
pub mod reply;

use crate::i18n::{Language, Translations};
use crate::llm::{with_retry, GenerationOptions, LLMClient, ResponseSchema, RetryPolicy};
use crate::types::{AppError, Destination, Itinerary, Location, Message, MessageRole, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub use reply::{CityMatch, DestinationBatch, ReplyShape, StructuredReply, SuggestedDestination};

/// Result of an AI destination search.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationSearch {
    pub destinations: Vec<Destination>,
    pub message: String,
}

/// The operations the orchestrator and surfaces consume.
#[async_trait]
pub trait TravelAi: Send + Sync {
    /// Free-text advice. `context` is the recent conversation, oldest first.
    async fn generate_advice(&self, text: &str, context: &[Message], lang: Language) -> String;

    async fn generate_itinerary(
        &self,
        destination_name: &str,
        preferences: &str,
        lang: Language,
        previous: Option<&Itinerary>,
    ) -> Option<Itinerary>;

    /// The returned location carries a fresh `ai-` id.
    async fn search_city(&self, query: &str, lang: Language) -> Option<Location>;

    async fn search_destinations(
        &self,
        query: &str,
        lang: Language,
        excluded_ids: &[String],
        max_results: usize,
    ) -> Option<DestinationSearch>;
}

/// Per-operation sampling settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationOptions {
    pub advice: GenerationOptions,
    pub itinerary: GenerationOptions,
    pub city: GenerationOptions,
    pub destinations: GenerationOptions,
}

impl Default for OperationOptions {
    fn default() -> Self {
        Self {
            advice: GenerationOptions::new(1000, 0.7),
            itinerary: GenerationOptions::new(2000, 0.7),
            city: GenerationOptions::new(200, 0.3),
            destinations: GenerationOptions::new(2000, 0.7),
        }
    }
}

/// Model-backed implementation of [`TravelAi`].
///
/// Several clients (one per API key) are used round-robin.
pub struct AiGateway {
    clients: Vec<Arc<dyn LLMClient>>,
    next: AtomicUsize,
    retry: RetryPolicy,
    options: OperationOptions,
}

impl AiGateway {
    pub fn new(clients: Vec<Arc<dyn LLMClient>>, retry: RetryPolicy) -> Self {
        if clients.is_empty() {
            tracing::warn!("AI gateway has no configured client; AI features will degrade");
        }
        Self {
            clients,
            next: AtomicUsize::new(0),
            retry,
            options: OperationOptions::default(),
        }
    }

    /// A gateway with no client; every call degrades.
    pub fn disabled() -> Self {
        Self::new(Vec::new(), RetryPolicy::none())
    }

    pub fn with_options(mut self, options: OperationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.clients.is_empty()
    }

    fn client(&self) -> Result<Arc<dyn LLMClient>> {
        if self.clients.is_empty() {
            return Err(AppError::Config("no AI API key configured".to_string()));
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        Ok(Arc::clone(&self.clients[idx]))
    }

    pub async fn try_generate_advice(
        &self,
        text: &str,
        context: &[Message],
        lang: Language,
    ) -> Result<String> {
        let client = self.client()?;
        let system = prompts::advice_system(lang);
        let mut history: Vec<(String, String)> = context
            .iter()
            .map(|m| {
                let role = match m.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                };
                (role.to_string(), m.content.clone())
            })
            .collect();
        history.push(("user".to_string(), text.to_string()));

        let raw = with_retry(&self.retry, "advice", || {
            client.generate_with_history(&system, &history, self.options.advice)
        })
        .await?;

        match StructuredReply::parse(ReplyShape::Advice, &raw)? {
            StructuredReply::Advice(text) => Ok(text),
            other => Err(unexpected(other)),
        }
    }

    pub async fn try_generate_itinerary(
        &self,
        destination_name: &str,
        preferences: &str,
        lang: Language,
        previous: Option<&Itinerary>,
    ) -> Result<Itinerary> {
        let client = self.client()?;
        let system = prompts::itinerary_system(destination_name, preferences, lang, previous);
        let user = prompts::itinerary_user(destination_name, lang);
        let schema = ResponseSchema::of::<Itinerary>("itinerary");

        let raw = with_retry(&self.retry, "itinerary", || {
            client.generate_structured(&system, &user, &schema, self.options.itinerary)
        })
        .await?;

        match StructuredReply::parse(ReplyShape::Itinerary, &raw)? {
            StructuredReply::Itinerary(itinerary) => Ok(itinerary),
            other => Err(unexpected(other)),
        }
    }

    pub async fn try_search_city(&self, query: &str, lang: Language) -> Result<Location> {
        let client = self.client()?;
        let system = prompts::city_system(query, lang);
        let user = prompts::city_user(query, lang);
        let schema = ResponseSchema::of::<CityMatch>("city");

        let raw = with_retry(&self.retry, "city", || {
            client.generate_structured(&system, &user, &schema, self.options.city)
        })
        .await?;

        match StructuredReply::parse(ReplyShape::City, &raw)? {
            StructuredReply::City(city) => Ok(Location {
                id: format!("ai-{}", uuid::Uuid::new_v4()),
                city: city.city,
                country: city.country,
                code: city.code,
                flag: city.flag,
            }),
            other => Err(unexpected(other)),
        }
    }

    pub async fn try_search_destinations(
        &self,
        query: &str,
        lang: Language,
        excluded_ids: &[String],
        max_results: usize,
    ) -> Result<DestinationSearch> {
        let client = self.client()?;
        let system = prompts::destinations_system(query, lang, excluded_ids, max_results);
        let user = prompts::destinations_user(query, lang);
        let schema = ResponseSchema::of::<DestinationBatch>("destinations");

        let raw = with_retry(&self.retry, "destinations", || {
            client.generate_structured(&system, &user, &schema, self.options.destinations)
        })
        .await?;

        let batch = match StructuredReply::parse(ReplyShape::Destinations, &raw)? {
            StructuredReply::Destinations(batch) => batch,
            other => return Err(unexpected(other)),
        };

        let stamp = chrono::Utc::now().timestamp_millis();
        let destinations = batch
            .destinations
            .into_iter()
            .filter(|d| d.id.as_ref().is_none_or(|id| !excluded_ids.contains(id)))
            .take(max_results)
            .enumerate()
            .map(|(idx, d)| d.into_destination(format!("ai-dest-{}-{}", stamp, idx)))
            .collect();

        Ok(DestinationSearch {
            destinations,
            message: batch.message,
        })
    }
}

fn unexpected(reply: StructuredReply) -> AppError {
    AppError::SchemaMismatch(format!("unexpected reply shape {:?}", reply.shape()))
}

#[async_trait]
impl TravelAi for AiGateway {
    async fn generate_advice(&self, text: &str, context: &[Message], lang: Language) -> String {
        let t = Translations::for_language(lang);
        match self.try_generate_advice(text, context, lang).await {
            Ok(advice) => advice,
            Err(AppError::Config(_)) => t.ai_unavailable.to_string(),
            Err(e @ AppError::RateLimited(_)) => {
                tracing::warn!("Advice request rate limited: {}", e);
                t.advice_rate_limited.to_string()
            }
            Err(e) => {
                tracing::error!("Advice request failed: {}", e);
                t.advice_unavailable.to_string()
            }
        }
    }

    async fn generate_itinerary(
        &self,
        destination_name: &str,
        preferences: &str,
        lang: Language,
        previous: Option<&Itinerary>,
    ) -> Option<Itinerary> {
        self.try_generate_itinerary(destination_name, preferences, lang, previous)
            .await
            .inspect_err(|e| {
                tracing::error!(destination = destination_name, "Itinerary generation failed: {}", e)
            })
            .ok()
    }

    async fn search_city(&self, query: &str, lang: Language) -> Option<Location> {
        self.try_search_city(query, lang)
            .await
            .inspect_err(|e| tracing::warn!(query, "City lookup failed: {}", e))
            .ok()
    }

    async fn search_destinations(
        &self,
        query: &str,
        lang: Language,
        excluded_ids: &[String],
        max_results: usize,
    ) -> Option<DestinationSearch> {
        self.try_search_destinations(query, lang, excluded_ids, max_results)
            .await
            .inspect_err(|e| tracing::warn!(query, "Destination search failed: {}", e))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_gateway_degrades() {
        let gateway = AiGateway::disabled();
        assert!(!gateway.is_enabled());
        assert_eq!(
            gateway.generate_advice("hi", &[], Language::En).await,
            "AI service temporarily unavailable, please try later"
        );
        assert!(gateway
            .generate_itinerary("Temple of Heaven", "temple", Language::En, None)
            .await
            .is_none());
        assert!(gateway.search_city("Tokyo", Language::En).await.is_none());
        assert!(gateway
            .search_destinations("beach", Language::En, &[], 10)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_try_variant_reports_config_error() {
        let gateway = AiGateway::disabled();
        let err = gateway.try_search_city("Tokyo", Language::En).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
