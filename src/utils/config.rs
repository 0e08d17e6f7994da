//! Runtime wiring from [`WayfarerConfig`] and the environment.

use super::toml_config::{AiBackend, SamplingConfig, StoreBackend, WayfarerConfig};
use crate::ai::{AiGateway, OperationOptions};
use crate::app::{AppOptions, TravelApp};
use crate::catalog::CityDirectory;
use crate::db::{PersistenceGateway, StoreProvider};
use crate::llm::{GenerationOptions, LLMClient, Provider};
use crate::orchestrator::OrchestratorConfig;
use crate::subscription::{StubCheckout, SubscriptionManager};
use std::sync::Arc;
use std::time::Duration;

/// Secrets resolved from the environment at startup.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    /// One entry per key; calls rotate through them
    pub ai_api_keys: Vec<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("ai_api_keys", &format_args!("[{} redacted]", self.ai_api_keys.len()))
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &self.supabase_anon_key.as_ref().map(|_| "redacted"))
            .finish()
    }
}

impl Secrets {
    /// Load `.env` (if any) and read the variables named by `config`.
    /// Missing values are logged, never fatal.
    pub fn resolve(config: &WayfarerConfig) -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Failed to load .env: {}", e),
        }
        Self::from_lookup(config, |name| config.resolve_env(name))
    }

    /// Resolution against an arbitrary lookup; `resolve` uses the process
    /// environment.
    pub fn from_lookup<F>(config: &WayfarerConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let ai_api_keys: Vec<String> = lookup(&config.ai.api_key_env)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let secrets = Self {
            ai_api_keys,
            supabase_url: lookup(&config.persistence.url_env),
            supabase_anon_key: lookup(&config.persistence.anon_key_env),
        };

        if config.ai.backend == AiBackend::ChatCompletions && secrets.ai_api_keys.is_empty() {
            tracing::warn!(env = %config.ai.api_key_env, "AI API key not set; AI features will degrade");
        }
        if config.persistence.backend == StoreBackend::Supabase
            && (secrets.supabase_url.is_none() || secrets.supabase_anon_key.is_none())
        {
            tracing::warn!(
                url_env = %config.persistence.url_env,
                key_env = %config.persistence.anon_key_env,
                "Persistence backend not configured; saved itineraries will be unavailable"
            );
        }
        secrets
    }
}

impl From<SamplingConfig> for GenerationOptions {
    fn from(s: SamplingConfig) -> Self {
        GenerationOptions::new(s.max_tokens, s.temperature)
    }
}

impl WayfarerConfig {
    /// One provider per API key (a single keyless provider for Ollama).
    pub fn providers(&self, secrets: &Secrets) -> Vec<Provider> {
        let timeout = Duration::from_secs(self.ai.timeout_secs);
        match self.ai.backend {
            AiBackend::ChatCompletions => secrets
                .ai_api_keys
                .iter()
                .map(|key| Provider::ChatCompletions {
                    api_key: key.clone(),
                    api_base: self.ai.api_base.clone(),
                    model: self.ai.model.clone(),
                    timeout,
                })
                .collect(),
            AiBackend::Ollama => vec![Provider::Ollama {
                base_url: self.ai.api_base.clone(),
                model: self.ai.model.clone(),
                timeout,
            }],
        }
    }

    pub fn operation_options(&self) -> OperationOptions {
        OperationOptions {
            advice: self.ai.advice.into(),
            itinerary: self.ai.itinerary.into(),
            city: self.ai.city.into(),
            destinations: self.ai.destinations.into(),
        }
    }

    pub fn ai_gateway(&self, secrets: &Secrets) -> AiGateway {
        let clients: Vec<Arc<dyn LLMClient>> = self
            .providers(secrets)
            .iter()
            .filter_map(|provider| {
                provider
                    .create_client()
                    .inspect_err(|e| {
                        tracing::warn!(provider = provider.name(), "Skipping AI client: {}", e)
                    })
                    .ok()
            })
            .collect();
        AiGateway::new(clients, self.retry.clone()).with_options(self.operation_options())
    }

    pub fn store_provider(&self, secrets: &Secrets) -> StoreProvider {
        match self.persistence.backend {
            StoreBackend::Memory => StoreProvider::Memory,
            StoreBackend::Supabase => StoreProvider::Supabase {
                url: secrets.supabase_url.clone(),
                anon_key: secrets.supabase_anon_key.clone(),
                table: self.persistence.table.clone(),
            },
        }
    }

    pub fn subscription_manager(&self) -> SubscriptionManager {
        let payments = Arc::new(StubCheckout);
        match &self.subscription.state_file {
            Some(path) => SubscriptionManager::new(path.clone(), payments),
            None => SubscriptionManager::in_memory(payments),
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let home = CityDirectory::global()
            .find_city(&self.app.home_city)
            .cloned()
            .unwrap_or_else(CityDirectory::home_city);
        OrchestratorConfig {
            language: self.app.language,
            home,
            lock_window: Duration::from_millis(self.interaction.lock_window_ms),
            ..OrchestratorConfig::default()
        }
    }

    pub fn app_options(&self) -> AppOptions {
        AppOptions {
            destination_search: self.ai.destination_search,
            max_search_results: self.ai.max_search_results,
            map_throttle: Duration::from_millis(self.interaction.map_throttle_ms),
        }
    }

    /// Assemble the whole application from this configuration.
    pub fn build_app(&self, secrets: &Secrets) -> TravelApp {
        let persistence = PersistenceGateway::new(self.store_provider(secrets).create_store());
        TravelApp::new(
            self.orchestrator_config(),
            persistence,
            self.subscription_manager(),
            Arc::new(self.ai_gateway(secrets)),
            self.app_options(),
        )
    }
}
