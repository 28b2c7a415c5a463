//! Diagnosis service
//!
//! The `KaizenService` is the request-level orchestration shared by the HTTP
//! handler and the CLI:
//! 1. Trims the user text and rejects empty input
//! 2. Tries the generative assist, when one is configured
//! 3. Falls back to the rule-based analyzer, which cannot fail
//!
//! # Example
//!
//! ```no_run
//! use ag_kaizen::{KaizenService, Taxonomy};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let taxonomy = Arc::new(Taxonomy::load("configs/taxonomy.yaml")?);
//! let service = KaizenService::rules_only(taxonomy);
//!
//! let diagnosis = service.diagnose("Trucks arrive late at the packhouse").await?;
//! println!("{}", diagnosis.analysis);
//! # Ok(())
//! # }
//! ```

use crate::assist::GenerativeAssist;
use crate::fallback::FallbackAnalyzer;
use crate::llm::LLMClient;
use crate::output::AnalysisResponse;
use crate::taxonomy::Taxonomy;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// Message returned when the user sent nothing to analyze
pub const EMPTY_INPUT_MESSAGE: &str =
    "Please describe your issue (e.g., irrigation delays, post-harvest spoilage).";

const LLM_REPLY: &str = "Kaizen diagnosis generated via LLM.";
const FALLBACK_REPLY: &str = "Diagnosis (rules fallback).";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{}", EMPTY_INPUT_MESSAGE)]
    EmptyInput,
}

/// Which path produced a diagnosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisSource {
    Llm,
    Rules,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub source: DiagnosisSource,
    pub analysis: AnalysisResponse,
}

impl Diagnosis {
    /// Narrative shown next to the analysis
    pub fn reply(&self) -> &'static str {
        match self.source {
            DiagnosisSource::Llm => LLM_REPLY,
            DiagnosisSource::Rules => FALLBACK_REPLY,
        }
    }
}

pub struct KaizenService {
    assist: Option<GenerativeAssist>,
    fallback: FallbackAnalyzer,
}

impl KaizenService {
    /// Creates a service; `client` of `None` disables the generative assist
    pub fn new(taxonomy: Arc<Taxonomy>, client: Option<Arc<dyn LLMClient>>) -> Self {
        let assist = client.map(|c| GenerativeAssist::new(c, taxonomy.clone()));
        match &assist {
            Some(a) => info!("Generative assist enabled via {}", a.client_name()),
            None => info!("Generative assist disabled, using rules only"),
        }

        Self {
            assist,
            fallback: FallbackAnalyzer::new(taxonomy),
        }
    }

    pub fn rules_only(taxonomy: Arc<Taxonomy>) -> Self {
        Self::new(taxonomy, None)
    }

    pub fn assist_enabled(&self) -> bool {
        self.assist.is_some()
    }

    pub async fn diagnose(&self, user_text: &str) -> Result<Diagnosis, ServiceError> {
        let text = user_text.trim();
        if text.is_empty() {
            return Err(ServiceError::EmptyInput);
        }

        let start = Instant::now();

        let llm_analysis = match &self.assist {
            Some(assist) => assist.try_llm(text).await,
            None => None,
        };

        let diagnosis = match llm_analysis {
            Some(analysis) => Diagnosis {
                source: DiagnosisSource::Llm,
                analysis,
            },
            None => Diagnosis {
                source: DiagnosisSource::Rules,
                analysis: self.fallback.analyze(text),
            },
        };

        info!(
            "Diagnosis via {:?} in {}ms: flow={}",
            diagnosis.source,
            start.elapsed().as_millis(),
            diagnosis.analysis.flow
        );

        Ok(diagnosis)
    }
}

impl std::fmt::Debug for KaizenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KaizenService")
            .field("assist", &self.assist)
            .finish()
    }
}
