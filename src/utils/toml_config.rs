//! TOML-based configuration for Wayfarer
//!
//! Settings live in `wayfarer.toml`. Secrets never do: the file names the
//! environment variables that hold them (`*_env` fields), and a missing
//! secret degrades the matching gateway instead of failing startup.

use crate::i18n::Language;
use crate::llm::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Root configuration structure loaded from wayfarer.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WayfarerConfig {
    pub app: AppSection,
    pub ai: AiConfig,
    pub retry: RetryPolicy,
    pub persistence: PersistenceConfig,
    pub interaction: InteractionConfig,
    pub subscription: SubscriptionConfig,
}

// ============= App =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub language: Language,

    pub log_level: String,

    /// City id from the built-in directory used as the initial departure
    pub home_city: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            language: Language::default(),
            log_level: "info".to_string(),
            home_city: "bj".to_string(),
        }
    }
}

// ============= AI =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiBackend {
    /// Hosted OpenAI-compatible endpoint with bearer auth
    #[default]
    ChatCompletions,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub backend: AiBackend,

    pub api_base: String,

    pub model: String,

    /// Environment variable holding the API key; several keys may be given
    /// comma-separated and are used in rotation
    pub api_key_env: String,

    pub timeout_secs: u64,

    /// Ask the model for destinations beyond the catalog on each chat send
    pub destination_search: bool,

    pub max_search_results: usize,

    pub advice: SamplingConfig,
    pub itinerary: SamplingConfig,
    pub city: SamplingConfig,
    pub destinations: SamplingConfig,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: AiBackend::default(),
            api_base: "https://ark.cn-beijing.volces.com/api/v3".to_string(),
            model: "doubao-pro-32k".to_string(),
            api_key_env: "WAYFARER_AI_API_KEY".to_string(),
            timeout_secs: 60,
            destination_search: false,
            max_search_results: 6,
            advice: SamplingConfig::new(1000, 0.7),
            itinerary: SamplingConfig::new(2000, 0.7),
            city: SamplingConfig::new(200, 0.3),
            destinations: SamplingConfig::new(2000, 0.7),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl SamplingConfig {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

// ============= Persistence =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    #[default]
    Supabase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub backend: StoreBackend,
    pub url_env: String,
    pub anon_key_env: String,
    pub table: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url_env: "WAYFARER_SUPABASE_URL".to_string(),
            anon_key_env: "WAYFARER_SUPABASE_ANON_KEY".to_string(),
            table: "saved_itineraries".to_string(),
        }
    }
}

// ============= Interaction =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// How long after an intent submission map interactions keep the chat open
    pub lock_window_ms: u64,
    /// Minimum gap between map pointer events forwarded to the orchestrator
    pub map_throttle_ms: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            lock_window_ms: 1000,
            map_throttle_ms: 200,
        }
    }
}

// ============= Subscription =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Where the active subscription is kept; in memory when unset
    pub state_file: Option<PathBuf>,
}

// ============= Loading & Validation =============

/// Non-fatal findings reported by [`WayfarerConfig::validate_with_warnings`]
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarningKind {
    MissingSecret,
    UnknownHomeCity,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl WayfarerConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: WayfarerConfig = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::FileNotFound(p)) => {
                warn!(path = %p.display(), "No configuration file; using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Structural checks only. Secrets are not required here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ai.backend == AiBackend::ChatCompletions && self.ai.api_key_env.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ai.api_key_env must name an environment variable".to_string(),
            ));
        }
        if !self.ai.api_base.starts_with("http://") && !self.ai.api_base.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "ai.api_base '{}' is not an http(s) URL",
                self.ai.api_base
            )));
        }
        if self.ai.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("ai.model is empty".to_string()));
        }
        if self.ai.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "ai.timeout_secs must be positive".to_string(),
            ));
        }
        if self.ai.max_search_results == 0 {
            return Err(ConfigError::ValidationError(
                "ai.max_search_results must be positive".to_string(),
            ));
        }
        for (name, sampling) in [
            ("advice", &self.ai.advice),
            ("itinerary", &self.ai.itinerary),
            ("city", &self.ai.city),
            ("destinations", &self.ai.destinations),
        ] {
            if sampling.max_tokens == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "ai.{}.max_tokens must be positive",
                    name
                )));
            }
            if !(0.0..=2.0).contains(&sampling.temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "ai.{}.temperature must be within 0.0..=2.0",
                    name
                )));
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::ValidationError(
                "retry.initial_backoff_ms exceeds retry.max_backoff_ms".to_string(),
            ));
        }

        if self.persistence.backend == StoreBackend::Supabase && self.persistence.table.trim().is_empty()
        {
            return Err(ConfigError::ValidationError(
                "persistence.table is empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate, then report what would make features degrade at runtime.
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();
        let mut secret = |env: &str, what: &str| {
            if self.resolve_env(env).is_none() {
                warnings.push(ConfigWarning {
                    kind: ConfigWarningKind::MissingSecret,
                    message: format!("{} is not set; {} will be unavailable", env, what),
                });
            }
        };
        if self.ai.backend == AiBackend::ChatCompletions {
            secret(&self.ai.api_key_env, "AI features");
        }
        if self.persistence.backend == StoreBackend::Supabase {
            secret(&self.persistence.url_env, "saved itineraries");
            secret(&self.persistence.anon_key_env, "saved itineraries");
        }

        if crate::catalog::CityDirectory::global()
            .find_city(&self.app.home_city)
            .is_none()
        {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::UnknownHomeCity,
                message: format!(
                    "app.home_city '{}' is not in the city directory; Beijing is used",
                    self.app.home_city
                ),
            });
        }

        Ok(warnings)
    }

    /// Non-blank value of an environment variable
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.trim().is_empty())
    }
}
