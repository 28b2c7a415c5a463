//! GenAI-based LLM client implementation
//!
//! This module provides an LLM client implementation using the `genai` crate,
//! supporting several providers (OpenAI, Claude, Gemini, Groq, Ollama) behind
//! the same [`LLMClient`] trait.

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
use async_trait::async_trait;
use clap::ValueEnum;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use std::time::Duration;
use tracing::{debug, error, info};

/// Supported LLM providers
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// OpenAI GPT models
    #[value(name = "openai")]
    OpenAI,
    /// Anthropic Claude
    Claude,
    /// Google Gemini
    Gemini,
    /// Groq
    Groq,
    /// Ollama local inference
    Ollama,
}

impl Provider {
    /// Parses a provider name, case-insensitive
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "claude" | "anthropic" => Some(Provider::Claude),
            "gemini" => Some(Provider::Gemini),
            "groq" => Some(Provider::Groq),
            "ollama" => Some(Provider::Ollama),
            _ => None,
        }
    }

    pub fn adapter_kind(&self) -> AdapterKind {
        match self {
            Provider::OpenAI => AdapterKind::OpenAI,
            Provider::Claude => AdapterKind::Anthropic,
            Provider::Gemini => AdapterKind::Gemini,
            Provider::Groq => AdapterKind::Groq,
            Provider::Ollama => AdapterKind::Ollama,
        }
    }

    /// Standard environment variable holding this provider's API key
    pub fn key_env_name(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::Claude => Some("ANTHROPIC_API_KEY"),
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::Ollama => None,
        }
    }

    /// Returns true when requests need an API key
    pub fn requires_key(&self) -> bool {
        self.key_env_name().is_some()
    }

    /// Returns the provider name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Claude => "Claude",
            Provider::Gemini => "Gemini",
            Provider::Groq => "Groq",
            Provider::Ollama => "Ollama",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAI => write!(f, "openai"),
            Provider::Claude => write!(f, "claude"),
            Provider::Gemini => write!(f, "gemini"),
            Provider::Groq => write!(f, "groq"),
            Provider::Ollama => write!(f, "ollama"),
        }
    }
}

/// GenAI-based LLM client
///
/// The API key is captured once at construction and injected into every
/// request through a service target resolver, so the process environment
/// is not consulted again at request time.
pub struct GenAIClient {
    client: Client,
    model: String,
    provider: Provider,
    timeout: Duration,
}

impl GenAIClient {
    /// Creates a new GenAI client
    ///
    /// # Arguments
    ///
    /// * `provider` - LLM provider to use
    /// * `model` - Model name (without provider prefix)
    /// * `api_key` - Credential, required unless the provider is keyless
    /// * `base_url` - Optional endpoint override
    /// * `timeout` - Request timeout
    pub fn new(
        provider: Provider,
        model: String,
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        if provider.requires_key() && api_key.as_deref().map_or(true, str::is_empty) {
            return Err(BackendError::ConfigurationError {
                message: format!(
                    "{} requires an API key (set KAIZEN_API_KEY or {})",
                    provider.name(),
                    provider.key_env_name().unwrap_or_default()
                ),
            });
        }

        if let Some(ref url) = base_url {
            debug!("Using custom endpoint for {}: {}", provider.name(), url);
        }

        let adapter = provider.adapter_kind();
        let model_clone = model.clone();

        let resolver = ServiceTargetResolver::from_resolver_fn(
            move |service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let endpoint = match &base_url {
                    Some(url) => Endpoint::from_owned(url.clone()),
                    None => service_target.endpoint,
                };

                let auth = match &api_key {
                    Some(key) => AuthData::from_single(key.clone()),
                    None => AuthData::from_single(""),
                };

                Ok(ServiceTarget {
                    endpoint,
                    auth,
                    model: ModelIden::new(adapter, &model_clone),
                })
            },
        );

        let client = Client::builder()
            .with_service_target_resolver(resolver)
            .build();

        debug!(
            "Creating GenAI client: provider={}, model={}, timeout={}s",
            provider.name(),
            model,
            timeout.as_secs()
        );

        Ok(Self {
            client,
            model,
            provider,
            timeout,
        })
    }

    fn convert_message(msg: &ChatMessage) -> GenAIChatMessage {
        match msg.role {
            MessageRole::System => GenAIChatMessage::system(&msg.content),
            MessageRole::User => GenAIChatMessage::user(&msg.content),
            MessageRole::Assistant => GenAIChatMessage::assistant(&msg.content),
        }
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = std::time::Instant::now();

        let messages: Vec<GenAIChatMessage> =
            request.messages.iter().map(Self::convert_message).collect();
        let genai_request = GenAIChatRequest::new(messages);

        let mut options = ChatOptions::default();
        if let Some(temp) = request.temperature {
            options = options.with_temperature(temp as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }

        let response = match tokio::time::timeout(
            self.timeout,
            self.client
                .exec_chat(&self.model, genai_request, Some(&options)),
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                error!("{} API error: {}", self.provider.name(), e);
                return Err(BackendError::ApiError {
                    message: format!("{} request failed: {}", self.provider.name(), e),
                    status_code: None,
                });
            }
            Err(_) => {
                error!(
                    "{} request timed out after {}s",
                    self.provider.name(),
                    self.timeout.as_secs()
                );
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let content = response
            .first_text()
            .ok_or_else(|| BackendError::InvalidResponse {
                message: "No text content in response".to_string(),
                raw_response: None,
            })?
            .to_string();

        let elapsed = start.elapsed();
        info!(
            "{} generation completed in {:.2}s ({} chars)",
            self.provider.name(),
            elapsed.as_secs_f64(),
            content.len()
        );

        Ok(LLMResponse::text(content, elapsed))
    }

    fn name(&self) -> &str {
        self.provider.name()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(Provider::parse("openai"), Some(Provider::OpenAI));
        assert_eq!(Provider::parse("Anthropic"), Some(Provider::Claude));
        assert_eq!(Provider::parse("OLLAMA"), Some(Provider::Ollama));
        assert_eq!(Provider::parse("mistral"), None);
    }

    #[test]
    fn test_provider_keys() {
        assert_eq!(Provider::OpenAI.key_env_name(), Some("OPENAI_API_KEY"));
        assert!(Provider::Claude.requires_key());
        assert!(!Provider::Ollama.requires_key());
    }

    #[test]
    fn test_client_creation() {
        let client = GenAIClient::new(
            Provider::OpenAI,
            "gpt-4o-mini".to_string(),
            Some("sk-test".to_string()),
            None,
            Duration::from_secs(20),
        )
        .unwrap();

        assert_eq!(client.name(), "OpenAI");
        assert_eq!(client.model_info(), Some("gpt-4o-mini".to_string()));
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let result = GenAIClient::new(
            Provider::OpenAI,
            "gpt-4o-mini".to_string(),
            None,
            None,
            Duration::from_secs(20),
        );
        assert!(matches!(
            result,
            Err(BackendError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_keyless_provider() {
        let client = GenAIClient::new(
            Provider::Ollama,
            "llama3.1:8b".to_string(),
            None,
            Some("http://localhost:11434/".to_string()),
            Duration::from_secs(20),
        )
        .unwrap();
        assert_eq!(client.name(), "Ollama");
    }

    #[test]
    fn test_debug_impl() {
        let client = GenAIClient::new(
            Provider::Ollama,
            "llama3.1:8b".to_string(),
            None,
            None,
            Duration::from_secs(20),
        )
        .unwrap();
        let debug_str = format!("{:?}", client);
        assert!(debug_str.contains("GenAIClient"));
        assert!(debug_str.contains("Ollama"));
    }
}
