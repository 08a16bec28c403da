use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Analysis mode sent with every request; the service only scores
/// existing ventures in this product.
pub const ANALYSIS_MODE: &str = "existing";
pub const STRATEGY_MODE: &str = "growth";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub idea: String,
    pub customer: String,
    pub pricing: String,
    pub team_size: u64,
    pub budget: String,
    pub situation: String,
    pub mode: String,
    pub strategy_mode: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AnalysisResult {
    pub health_score: Option<i64>,
    pub market_health: Option<i64>,
    pub execution_health: Option<i64>,
    pub finance_health: Option<i64>,
    pub growth_health: Option<i64>,
    pub biggest_problem: Option<String>,
    pub improvements: Vec<String>,
    pub insight: Option<String>,
}

impl AnalysisResult {
    /// Decodes whatever the scoring service returned. Missing or
    /// mistyped fields become absent values, never an error.
    pub fn from_value(value: &Value) -> Self {
        Self {
            health_score: score_field(value, "health_score"),
            market_health: score_field(value, "market_health"),
            execution_health: score_field(value, "execution_health"),
            finance_health: score_field(value, "finance_health"),
            growth_health: score_field(value, "growth_health"),
            biggest_problem: text_field(value, "biggest_problem"),
            improvements: list_field(value, "improvements"),
            insight: text_field(value, "insight"),
        }
    }

    pub fn reveal_target(&self) -> i64 {
        self.health_score.unwrap_or(0).max(0)
    }
}

fn score_field(value: &Value, key: &str) -> Option<i64> {
    let field = value.get(key)?;
    field
        .as_i64()
        .or_else(|| field.as_f64().map(|score| score.round() as i64))
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn list_field(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn analysis_request_carries_mode_constants() {
        let request = AnalysisRequest {
            idea: "fleet telemetry".to_string(),
            customer: "logistics ops".to_string(),
            pricing: "per vehicle".to_string(),
            team_size: 4,
            budget: "50k".to_string(),
            situation: "pre-revenue".to_string(),
            mode: ANALYSIS_MODE.to_string(),
            strategy_mode: STRATEGY_MODE.to_string(),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["mode"], "existing");
        assert_eq!(value["strategy_mode"], "growth");
        assert_eq!(value["team_size"], 4);
    }

    #[test]
    fn result_decodes_full_response() {
        let value = json!({
            "health_score": 87,
            "market_health": 72,
            "execution_health": 81,
            "finance_health": 64,
            "growth_health": 90,
            "biggest_problem": "churn",
            "improvements": ["talk to users", "cut burn"],
            "insight": "focus on retention",
        });
        let result = AnalysisResult::from_value(&value);
        assert_eq!(result.health_score, Some(87));
        assert_eq!(result.finance_health, Some(64));
        assert_eq!(result.biggest_problem.as_deref(), Some("churn"));
        assert_eq!(result.improvements.len(), 2);
        assert_eq!(result.insight.as_deref(), Some("focus on retention"));
        assert_eq!(result.reveal_target(), 87);
    }

    #[test]
    fn result_tolerates_missing_fields() {
        let result = AnalysisResult::from_value(&json!({ "health_score": 40 }));
        assert_eq!(result.health_score, Some(40));
        assert_eq!(result.market_health, None);
        assert!(result.improvements.is_empty());
        assert_eq!(result.insight, None);
    }

    #[test]
    fn result_tolerates_mistyped_fields() {
        let value = json!({
            "health_score": "not a number",
            "improvements": "not a list",
            "biggest_problem": 12,
        });
        let result = AnalysisResult::from_value(&value);
        assert_eq!(result.health_score, None);
        assert!(result.improvements.is_empty());
        assert_eq!(result.biggest_problem, None);
    }

    #[test]
    fn result_rounds_fractional_scores() {
        let result = AnalysisResult::from_value(&json!({ "health_score": 86.6 }));
        assert_eq!(result.health_score, Some(87));
    }

    #[test]
    fn reveal_target_defaults_to_zero() {
        assert_eq!(AnalysisResult::default().reveal_target(), 0);
        let negative = AnalysisResult::from_value(&json!({ "health_score": -5 }));
        assert_eq!(negative.reveal_target(), 0);
    }
}
