//! Generative assist
//!
//! Sends the user's problem to the configured LLM with a fixed consultant
//! prompt and one worked example, then parses, repairs and validates the
//! reply. [`GenerativeAssist::analyze`] reports which stage failed;
//! [`GenerativeAssist::try_llm`] collapses every failure to `None` so the
//! caller can switch to the rule-based fallback.

pub mod prompt;
pub mod response;

use crate::llm::{BackendError, LLMClient, LLMRequest};
use crate::output::AnalysisResponse;
use crate::taxonomy::Taxonomy;
use crate::validation::Validator;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use response::ParseError;

/// Sampling temperature; kept low so replies stay close to the schema
pub const TEMPERATURE: f32 = 0.2;

/// Output token budget for one diagnosis
pub const MAX_TOKENS: u32 = 800;

#[derive(Debug, Error)]
pub enum AssistError {
    /// Transport, timeout, auth or provider failure
    #[error("LLM call failed: {0}")]
    Backend(#[from] BackendError),

    /// The reply could not be turned into an analysis object
    #[error("Could not parse LLM reply: {0}")]
    Parse(#[from] ParseError),

    /// The repaired analysis still violates the schema
    #[error("LLM analysis failed validation: {0}")]
    Schema(String),
}

impl AssistError {
    pub fn kind(&self) -> &'static str {
        match self {
            AssistError::Backend(_) => "backend",
            AssistError::Parse(_) => "parse",
            AssistError::Schema(_) => "schema",
        }
    }
}

pub struct GenerativeAssist {
    client: Arc<dyn LLMClient>,
    taxonomy: Arc<Taxonomy>,
    validator: Validator,
    system_prompt: String,
}

impl GenerativeAssist {
    pub fn new(client: Arc<dyn LLMClient>, taxonomy: Arc<Taxonomy>) -> Self {
        let system_prompt = prompt::build_system_prompt(&taxonomy);
        Self {
            client,
            validator: Validator::new(taxonomy.clone()),
            taxonomy,
            system_prompt,
        }
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    pub fn build_request(&self, user_text: &str) -> LLMRequest {
        LLMRequest::new(prompt::build_messages(&self.system_prompt, user_text))
            .with_temperature(TEMPERATURE)
            .with_max_tokens(MAX_TOKENS)
    }

    /// One LLM round trip, no retries
    pub async fn analyze(&self, user_text: &str) -> Result<AnalysisResponse, AssistError> {
        let request = self.build_request(user_text);

        debug!(
            "Sending diagnosis request to {} ({} messages)",
            self.client.name(),
            request.messages.len()
        );

        let response = self.client.chat(request).await?;
        debug!(
            "Received {} chars in {}ms",
            response.content.len(),
            response.response_time.as_millis()
        );

        let analysis = response::parse_analysis_reply(&response.content, &self.taxonomy)?;

        self.validator
            .validate(&analysis)
            .map_err(|e| AssistError::Schema(e.to_string()))?;

        info!(
            "LLM diagnosis: flow={}, wastes={:?}",
            analysis.flow, analysis.wastes
        );

        Ok(analysis)
    }

    /// Like [`analyze`](Self::analyze) but never fails; errors are logged
    pub async fn try_llm(&self, user_text: &str) -> Option<AnalysisResponse> {
        match self.analyze(user_text).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!("Generative assist unavailable ({}): {}", e.kind(), e);
                None
            }
        }
    }
}

impl std::fmt::Debug for GenerativeAssist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerativeAssist")
            .field("client", &self.client.name())
            .field("validator", &self.validator)
            .finish()
    }
}
