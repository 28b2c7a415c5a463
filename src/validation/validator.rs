use crate::output::AnalysisResponse;
use crate::taxonomy::Taxonomy;
use crate::validation::rules::{
    CheckInRangeRule, FlowMembershipRule, ValidationRule, WasteCountRule, WasteMembershipRule,
};
use anyhow::Result;
use std::sync::Arc;

pub struct Validator {
    taxonomy: Arc<Taxonomy>,
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            taxonomy,
            rules: vec![
                Box::new(FlowMembershipRule),
                Box::new(WasteCountRule),
                Box::new(WasteMembershipRule),
                Box::new(CheckInRangeRule),
            ],
        }
    }

    pub fn with_rules(taxonomy: Arc<Taxonomy>, rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { taxonomy, rules }
    }

    pub fn validate(&self, analysis: &AnalysisResponse) -> Result<()> {
        for rule in &self.rules {
            if let Err(e) = rule.validate(analysis, &self.taxonomy) {
                anyhow::bail!("[{}] {}", rule.name(), e);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
