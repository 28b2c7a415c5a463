//! Kaizen diagnosis schema
//!
//! This module defines the `AnalysisResponse` returned to callers, whether it
//! was produced by the generative model or by the rule-based fallback. The
//! JSON field names are part of the public contract of `POST /chat`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest allowed follow-up interval in days
pub const MIN_CHECK_IN_DAYS: u32 = 1;
/// Highest allowed follow-up interval in days
pub const MAX_CHECK_IN_DAYS: u32 = 90;

/// Three-step scale used for both impact and effort of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single improvement action with its expected impact and effort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: String,
    pub impact: Level,
    pub effort: Level,
}

impl Recommendation {
    pub fn new(action: impl Into<String>, impact: Level, effort: Level) -> Self {
        Self {
            action: action.into(),
            impact,
            effort,
        }
    }
}

/// Structured kaizen diagnosis
///
/// `flow` and every entry of `wastes` must belong to the loaded taxonomy, and
/// `next_check_in_days` must lie in `[1, 90]`. Those constraints are checked
/// by [`crate::validation::Validator`], not by deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// One-line description of the problem
    pub summary: String,
    /// Process flow the problem belongs to
    pub flow: String,
    /// Lean waste categories, 1 to 3 entries
    pub wastes: Vec<String>,
    pub root_causes: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    /// Small experiment the farmer can run right away
    pub quick_test: String,
    /// KPI identifiers worth tracking
    pub kpis: Vec<String>,
    pub next_check_in_days: u32,
}

impl AnalysisResponse {
    /// Serialize the diagnosis to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize AnalysisResponse to JSON")
    }
}

impl fmt::Display for AnalysisResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Kaizen Diagnosis")?;
        writeln!(f, "================")?;
        writeln!(f, "Summary: {}", self.summary)?;
        writeln!(f, "Flow:    {}", self.flow)?;
        writeln!(f, "Wastes:  {}", self.wastes.join(", "))?;
        writeln!(f)?;

        if !self.root_causes.is_empty() {
            writeln!(f, "Root Causes:")?;
            for cause in &self.root_causes {
                writeln!(f, "  - {}", cause)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Recommendations:")?;
        for rec in &self.recommendations {
            writeln!(
                f,
                "  - {} (impact: {}, effort: {})",
                rec.action, rec.impact, rec.effort
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Quick Test: {}", self.quick_test)?;
        writeln!(f, "KPIs:       {}", self.kpis.join(", "))?;
        writeln!(f, "Check in after {} days", self.next_check_in_days)?;

        Ok(())
    }
}
