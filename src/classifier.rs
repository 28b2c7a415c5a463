//! Keyword-based flow and waste classification
//!
//! Pure substring matching over the taxonomy's synonym keywords. This is the
//! deterministic path that keeps `/chat` answering when the generative model
//! is unavailable.

use crate::taxonomy::{Taxonomy, DEFAULT_FLOW, DEFAULT_WASTE};
use std::sync::Arc;
use tracing::trace;

/// Words that point to post-harvest handling when no synonym matched
const POST_HARVEST_HINTS: &[&str] = &["harvest", "brown", "cool"];

/// Words that point to waiting when no waste synonym matched
const WAITING_HINTS: &[&str] = &["truck", "delay", "late"];

const WAITING_WASTE: &str = "waiting";
const POST_HARVEST_FLOW: &str = "post_harvest";

/// Maximum number of wastes reported for one problem
pub const MAX_WASTES: usize = 3;

fn contains_any<S: AsRef<str>>(text: &str, words: &[S]) -> bool {
    words.iter().any(|w| text.contains(w.as_ref()))
}

/// Rule classifier bound to one taxonomy
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    taxonomy: Arc<Taxonomy>,
}

impl RuleClassifier {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Returns the first flow (in synonym file order) with a keyword present
    /// in `text`, then falls back to the post-harvest hints, then to
    /// `field_ops`.
    pub fn detect_flow(&self, text: &str) -> String {
        let lowered = text.to_lowercase();

        for (flow, words) in self.taxonomy.synonyms() {
            if self.taxonomy.is_flow(flow) && contains_any(&lowered, words) {
                trace!("Flow '{}' matched by synonym", flow);
                return flow.to_string();
            }
        }

        if contains_any(&lowered, POST_HARVEST_HINTS) {
            return POST_HARVEST_FLOW.to_string();
        }

        DEFAULT_FLOW.to_string()
    }

    /// Returns between 1 and 3 waste ids, in taxonomy order
    ///
    /// The hint-based default (`waiting` or `motion`) is only used when no
    /// synonym matched at all.
    pub fn detect_wastes(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();

        let mut hits: Vec<String> = self
            .taxonomy
            .wastes()
            .iter()
            .filter(|waste| contains_any(&lowered, self.taxonomy.keywords(waste)))
            .cloned()
            .collect();

        if hits.is_empty() {
            let default = if contains_any(&lowered, WAITING_HINTS) {
                WAITING_WASTE
            } else {
                DEFAULT_WASTE
            };
            hits.push(default.to_string());
        }

        hits.truncate(MAX_WASTES);
        hits
    }
}
