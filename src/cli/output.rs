//! Output formatting for the `analyze` command
//!
//! JSON output has the same `{reply, analysis}` shape as `POST /chat`.

use crate::service::{Diagnosis, DiagnosisSource};
use anyhow::{Context, Result};
use serde_json::json;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, diagnosis: &Diagnosis) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_json(diagnosis),
            OutputFormat::Human => Ok(self.format_human(diagnosis)),
        }
    }

    /// Formats the empty-input message the same way `/chat` reports it
    pub fn format_error(&self, message: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&json!({ "error": message }))
                .context("Failed to serialize error to JSON"),
            OutputFormat::Human => Ok(message.to_string()),
        }
    }

    fn format_json(&self, diagnosis: &Diagnosis) -> Result<String> {
        serde_json::to_string_pretty(&json!({
            "reply": diagnosis.reply(),
            "analysis": diagnosis.analysis,
        }))
        .context("Failed to serialize diagnosis to JSON")
    }

    fn format_human(&self, diagnosis: &Diagnosis) -> String {
        let mut output = String::new();
        output.push_str(diagnosis.reply());
        output.push('\n');
        if diagnosis.source == DiagnosisSource::Rules {
            output.push_str("(LLM unavailable; keyword rules were used)\n");
        }
        output.push('\n');
        output.push_str(&diagnosis.analysis.to_string());
        output
    }
}
