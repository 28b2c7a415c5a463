use crate::classifier::MAX_WASTES;
use crate::output::{AnalysisResponse, MAX_CHECK_IN_DAYS, MIN_CHECK_IN_DAYS};
use crate::taxonomy::Taxonomy;
use anyhow::Result;

pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, analysis: &AnalysisResponse, taxonomy: &Taxonomy) -> Result<()>;
}

pub struct FlowMembershipRule;

impl ValidationRule for FlowMembershipRule {
    fn name(&self) -> &'static str {
        "FlowMembership"
    }

    fn validate(&self, analysis: &AnalysisResponse, taxonomy: &Taxonomy) -> Result<()> {
        if !taxonomy.is_flow(&analysis.flow) {
            anyhow::bail!("Unknown flow '{}'", analysis.flow);
        }
        Ok(())
    }
}

pub struct WasteCountRule;

impl ValidationRule for WasteCountRule {
    fn name(&self) -> &'static str {
        "WasteCount"
    }

    fn validate(&self, analysis: &AnalysisResponse, _taxonomy: &Taxonomy) -> Result<()> {
        let count = analysis.wastes.len();
        if count == 0 || count > MAX_WASTES {
            anyhow::bail!(
                "Expected between 1 and {} wastes, got {}",
                MAX_WASTES,
                count
            );
        }
        Ok(())
    }
}

pub struct WasteMembershipRule;

impl ValidationRule for WasteMembershipRule {
    fn name(&self) -> &'static str {
        "WasteMembership"
    }

    fn validate(&self, analysis: &AnalysisResponse, taxonomy: &Taxonomy) -> Result<()> {
        for (i, waste) in analysis.wastes.iter().enumerate() {
            if !taxonomy.is_waste(waste) {
                anyhow::bail!("wastes[{}] '{}' is not a known waste", i, waste);
            }
        }
        Ok(())
    }
}

pub struct CheckInRangeRule;

impl ValidationRule for CheckInRangeRule {
    fn name(&self) -> &'static str {
        "CheckInRange"
    }

    fn validate(&self, analysis: &AnalysisResponse, _taxonomy: &Taxonomy) -> Result<()> {
        if !(MIN_CHECK_IN_DAYS..=MAX_CHECK_IN_DAYS).contains(&analysis.next_check_in_days) {
            anyhow::bail!(
                "next_check_in_days must be between {} and {}, got {}",
                MIN_CHECK_IN_DAYS,
                MAX_CHECK_IN_DAYS,
                analysis.next_check_in_days
            );
        }
        Ok(())
    }
}
