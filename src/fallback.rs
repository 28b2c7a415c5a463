//! Rule-based diagnosis used when the generative model is unavailable
//!
//! Always produces a schema-valid [`AnalysisResponse`]: the classifier picks
//! the flow and wastes, a fixed table picks KPIs, and the remaining fields
//! are placeholders that tell the user the result is preliminary.

use crate::classifier::RuleClassifier;
use crate::output::{AnalysisResponse, Level, Recommendation};
use crate::taxonomy::{Taxonomy, DEFAULT_FLOW, DEFAULT_WASTE};
use std::sync::Arc;
use tracing::debug;

const FALLBACK_SUMMARY: &str = "Preliminary diagnosis (rules-only).";
const FALLBACK_ROOT_CAUSE: &str = "unverified_root_cause";
const FALLBACK_ACTION: &str = "Run a 1-week PDCA pilot on one plot";
const FALLBACK_QUICK_TEST: &str = "Pick one small change, measure daily, review after 7 days.";
const FALLBACK_CHECK_IN_DAYS: u32 = 7;

/// KPIs suggested for a flow
pub fn kpis_for_flow(flow: &str) -> Vec<String> {
    let kpis: &[&str] = match flow {
        "post_harvest" => &["time_to_cool_min", "storage_loss_pct", "claim_rate_pct"],
        "inputs_logistics" => &["avg_steps_per_worker", "crates_per_hour"],
        _ => &["cycle_time_min", "throughput_units_per_hour"],
    };
    kpis.iter().map(|k| k.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct FallbackAnalyzer {
    classifier: RuleClassifier,
}

impl FallbackAnalyzer {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            classifier: RuleClassifier::new(taxonomy),
        }
    }

    pub fn analyze(&self, text: &str) -> AnalysisResponse {
        let taxonomy = self.classifier.taxonomy();

        // KPIs follow the classifier's guess even when the flow itself is coerced.
        let flow_guess = self.classifier.detect_flow(text);
        let kpis = kpis_for_flow(&flow_guess);
        let flow = if taxonomy.is_flow(&flow_guess) {
            flow_guess
        } else {
            DEFAULT_FLOW.to_string()
        };

        let mut wastes: Vec<String> = self
            .classifier
            .detect_wastes(text)
            .into_iter()
            .filter(|w| taxonomy.is_waste(w))
            .collect();
        if wastes.is_empty() {
            wastes.push(DEFAULT_WASTE.to_string());
        }

        debug!("Fallback diagnosis: flow={}, wastes={:?}", flow, wastes);

        AnalysisResponse {
            summary: FALLBACK_SUMMARY.to_string(),
            kpis,
            flow,
            wastes,
            root_causes: vec![FALLBACK_ROOT_CAUSE.to_string()],
            recommendations: vec![Recommendation::new(
                FALLBACK_ACTION,
                Level::Medium,
                Level::Low,
            )],
            quick_test: FALLBACK_QUICK_TEST.to_string(),
            next_check_in_days: FALLBACK_CHECK_IN_DAYS,
        }
    }
}
