use std::collections::BTreeMap;

use protocol::{AnalysisRequest, ANALYSIS_MODE, STRATEGY_MODE};

/// User-entered form values. The key set is fixed for the session;
/// writes are stored verbatim and only coerced when a request is built.
#[derive(Debug, Clone)]
pub(crate) struct FormFields {
    idea: String,
    customer: String,
    pricing: String,
    team_size: String,
    budget: String,
    situation: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            idea: String::new(),
            customer: String::new(),
            pricing: String::new(),
            team_size: "1".to_string(),
            budget: String::new(),
            situation: String::new(),
        }
    }
}

impl FormFields {
    pub(crate) fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "idea" => &mut self.idea,
            "customer" => &mut self.customer,
            "pricing" => &mut self.pricing,
            "team_size" => &mut self.team_size,
            "budget" => &mut self.budget,
            "situation" => &mut self.situation,
            _ => return false,
        };
        *slot = value;
        true
    }

    pub(crate) fn entries(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("idea".to_string(), self.idea.clone()),
            ("customer".to_string(), self.customer.clone()),
            ("pricing".to_string(), self.pricing.clone()),
            ("team_size".to_string(), self.team_size.clone()),
            ("budget".to_string(), self.budget.clone()),
            ("situation".to_string(), self.situation.clone()),
        ])
    }

    pub(crate) fn build_request(&self) -> Result<AnalysisRequest, String> {
        let team_size = self
            .team_size
            .trim()
            .parse::<u64>()
            .map_err(|_| "team size must be a number".to_string())?;
        Ok(AnalysisRequest {
            idea: self.idea.clone(),
            customer: self.customer.clone(),
            pricing: self.pricing.clone(),
            team_size,
            budget: self.budget.clone(),
            situation: self.situation.clone(),
            mode: ANALYSIS_MODE.to_string(),
            strategy_mode: STRATEGY_MODE.to_string(),
        })
    }
}
