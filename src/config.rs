//! Configuration management for ag-kaizen
//!
//! Settings are loaded from environment variables with sensible defaults.
//! The API key is the only secret and is read exactly once, here.
//!
//! # Environment Variables
//!
//! - `KAIZEN_PROVIDER`: Provider selection (openai|claude|gemini|groq|ollama) - default: "openai"
//! - `KAIZEN_MODEL`: Model name - default: "gpt-4o-mini" (OpenAI) or a provider-specific default
//! - `KAIZEN_API_KEY`: Provider credential; falls back to the provider's standard
//!   variable (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `GEMINI_API_KEY`, `GROQ_API_KEY`)
//! - `KAIZEN_API_BASE_URL`: Optional endpoint override
//! - `KAIZEN_REQUEST_TIMEOUT`: LLM timeout in seconds - default: "20"
//! - `KAIZEN_TAXONOMY_PATH`: Taxonomy file - default: "configs/taxonomy.yaml"
//! - `KAIZEN_BIND_ADDR`: HTTP listen address - default: "127.0.0.1:8000"
//! - `KAIZEN_LLM_ENABLED`: Use the generative assist (true|false) - default: "true"
//! - `KAIZEN_LOG_LEVEL`: Logging level - default: "info"

use crate::llm::{BackendError, GenAIClient, LLMClient, Provider};
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
const DEFAULT_TAXONOMY_PATH: &str = "configs/taxonomy.yaml";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid provider name
    #[error("Invalid provider: {0}. Valid options: openai, claude, gemini, groq, ollama")]
    InvalidProvider(String),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    /// LLM client initialization failed
    #[error("LLM client initialization failed: {0}")]
    ClientInitError(#[from] BackendError),
}

pub(crate) fn default_model(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAI => DEFAULT_OPENAI_MODEL,
        Provider::Claude => DEFAULT_CLAUDE_MODEL,
        Provider::Gemini => DEFAULT_GEMINI_MODEL,
        Provider::Groq => DEFAULT_GROQ_MODEL,
        Provider::Ollama => DEFAULT_OLLAMA_MODEL,
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn api_key_for(provider: Provider) -> Option<String> {
    non_empty_var("KAIZEN_API_KEY").or_else(|| provider.key_env_name().and_then(non_empty_var))
}

fn provider_from_env() -> Result<Provider, ConfigError> {
    match non_empty_var("KAIZEN_PROVIDER") {
        Some(name) => Provider::parse(&name).ok_or(ConfigError::InvalidProvider(name)),
        None => Ok(Provider::OpenAI),
    }
}

fn timeout_from_env() -> Result<u64, ConfigError> {
    match non_empty_var("KAIZEN_REQUEST_TIMEOUT") {
        Some(v) => v.trim().parse::<u64>().map_err(|e| ConfigError::ParseError {
            field: "KAIZEN_REQUEST_TIMEOUT".to_string(),
            error: e.to_string(),
        }),
        None => Ok(DEFAULT_REQUEST_TIMEOUT_SECS),
    }
}

fn llm_enabled_from_env() -> Result<bool, ConfigError> {
    match non_empty_var("KAIZEN_LLM_ENABLED") {
        Some(v) => v.trim().parse::<bool>().map_err(|e| ConfigError::ParseError {
            field: "KAIZEN_LLM_ENABLED".to_string(),
            error: e.to_string(),
        }),
        None => Ok(true),
    }
}

fn or_default<T>(value: Result<T, ConfigError>, default: T) -> T {
    value.unwrap_or_else(|e| {
        warn!("{}, using the default", e);
        default
    })
}

/// Main configuration structure for ag-kaizen
#[derive(Clone)]
pub struct KaizenConfig {
    pub provider: Provider,
    pub model: String,
    /// Provider credential, never printed
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub request_timeout_secs: u64,
    pub taxonomy_path: PathBuf,
    pub bind_addr: String,
    pub llm_enabled: bool,
    pub log_level: String,
}

impl KaizenConfig {
    /// Loads configuration from `KAIZEN_*` environment variables
    ///
    /// Unlike [`Default`], an unknown provider or an unparsable number is
    /// reported instead of replaced.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::from_parts(
            provider_from_env()?,
            timeout_from_env()?,
            llm_enabled_from_env()?,
        ))
    }

    /// Assembles a configuration around the fallible values, reading the
    /// rest from the environment
    fn from_parts(provider: Provider, request_timeout_secs: u64, llm_enabled: bool) -> Self {
        let model =
            non_empty_var("KAIZEN_MODEL").unwrap_or_else(|| default_model(provider).to_string());

        let taxonomy_path = non_empty_var("KAIZEN_TAXONOMY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TAXONOMY_PATH));

        let bind_addr =
            non_empty_var("KAIZEN_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let log_level = non_empty_var("KAIZEN_LOG_LEVEL")
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            provider,
            model,
            api_key: api_key_for(provider),
            api_base_url: non_empty_var("KAIZEN_API_BASE_URL"),
            request_timeout_secs,
            taxonomy_path,
            bind_addr,
            llm_enabled,
            log_level,
        }
    }

    /// Switches to another provider
    ///
    /// The credential is looked up again for the new provider and the model
    /// goes back to that provider's default unless `KAIZEN_MODEL` pins it.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        if provider == self.provider {
            return self;
        }
        self.provider = provider;
        self.api_key = api_key_for(provider);
        if non_empty_var("KAIZEN_MODEL").is_none() {
            self.model = default_model(provider).to_string();
        }
        self
    }

    /// Validates the configuration
    ///
    /// Checks timeout bounds, the bind address and the log level. Missing
    /// credentials are not an error: the service then runs rules-only.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid bind address: {}",
                self.bind_addr
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Creates the LLM client, or `None` when the assist is disabled or
    /// no credential is available
    pub fn create_llm_client(&self) -> Result<Option<Arc<dyn LLMClient>>, ConfigError> {
        if !self.llm_enabled {
            return Ok(None);
        }

        if self.provider.requires_key() && self.api_key.is_none() {
            warn!(
                "No API key for {} (KAIZEN_API_KEY or {}), generative assist disabled",
                self.provider.name(),
                self.provider.key_env_name().unwrap_or_default()
            );
            return Ok(None);
        }

        let client = GenAIClient::new(
            self.provider,
            self.model.clone(),
            self.api_key.clone(),
            self.api_base_url.clone(),
            self.request_timeout(),
        )?;

        Ok(Some(Arc::new(client)))
    }
}

impl Default for KaizenConfig {
    /// Loads from the environment, replacing only the values that are
    /// invalid with their defaults
    fn default() -> Self {
        Self::from_parts(
            or_default(provider_from_env(), Provider::OpenAI),
            or_default(timeout_from_env(), DEFAULT_REQUEST_TIMEOUT_SECS),
            or_default(llm_enabled_from_env(), true),
        )
    }
}

impl fmt::Debug for KaizenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KaizenConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("taxonomy_path", &self.taxonomy_path)
            .field("bind_addr", &self.bind_addr)
            .field("llm_enabled", &self.llm_enabled)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl fmt::Display for KaizenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ag-Kaizen Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider)?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(
            f,
            "  API Key: {}",
            if self.api_key.is_some() { "set" } else { "not set" }
        )?;
        if let Some(ref url) = self.api_base_url {
            writeln!(f, "  API Base URL: {}", url)?;
        }
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Taxonomy: {}", self.taxonomy_path.display())?;
        writeln!(f, "  Bind Address: {}", self.bind_addr)?;
        writeln!(f, "  LLM Enabled: {}", self.llm_enabled)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
