//! ag-kaizen - Kaizen-style diagnosis for farm operations problems
//!
//! This library turns a free-text problem description ("lettuce browns before
//! delivery, trucks come every two days") into a structured Kaizen diagnosis:
//! the value-stream flow it belongs to, up to three lean wastes, root causes,
//! recommendations, a quick experiment, KPIs and a check-in interval.
//!
//! # Core Concepts
//!
//! - **Taxonomy**: The allowed flow and waste ids plus keyword synonyms,
//!   loaded once from YAML
//! - **Generative Assist**: One LLM round trip whose reply is extracted,
//!   repaired and validated against the taxonomy
//! - **Fallback Analyzer**: Keyword rules that always produce a valid
//!   diagnosis when the LLM is unavailable or answers badly
//!
//! # Example Usage
//!
//! ```no_run
//! use ag_kaizen::{KaizenService, Taxonomy};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let taxonomy = Arc::new(Taxonomy::load("configs/taxonomy.yaml")?);
//! let service = KaizenService::rules_only(taxonomy);
//!
//! let diagnosis = service.diagnose("Cows queue at the milking parlour").await?;
//! println!("{}: {}", diagnosis.reply(), diagnosis.analysis.flow);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`taxonomy`]: Taxonomy loading and lookups
//! - [`classifier`] and [`fallback`]: Rule-based diagnosis
//! - [`llm`] and [`assist`]: LLM client abstraction and the generative path
//! - [`validation`]: Rules every diagnosis must satisfy
//! - [`service`] and [`server`]: Request orchestration and the HTTP API

pub mod assist;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod fallback;
pub mod llm;
pub mod output;
pub mod server;
pub mod service;
pub mod taxonomy;
pub mod util;
pub mod validation;

// Re-export key types for convenient access
pub use assist::{AssistError, GenerativeAssist};
pub use classifier::RuleClassifier;
pub use config::{ConfigError, KaizenConfig};
pub use fallback::FallbackAnalyzer;
pub use llm::{BackendError, GenAIClient, LLMClient, Provider};
pub use output::{AnalysisResponse, Level, Recommendation};
pub use service::{Diagnosis, DiagnosisSource, KaizenService, ServiceError};
pub use taxonomy::{Taxonomy, TaxonomyError};
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use validation::Validator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_ag_kaizen() {
        assert_eq!(NAME, "ag-kaizen");
    }
}
