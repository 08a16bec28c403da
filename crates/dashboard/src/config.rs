use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_ANALYZE_PATH: &str = "/dashboard/analyze";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_REVEAL_STEP: i64 = 2;
const DEFAULT_REVEAL_TICK_MS: u64 = 20;
const DEFAULT_SETTLE_DELAY_MS: u64 = 700;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardConfig {
    pub(crate) api: Option<ApiSection>,
    pub(crate) reveal: Option<RevealSection>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiSection {
    pub(crate) base_url: Option<String>,
    pub(crate) analyze_path: Option<String>,
    pub(crate) request_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RevealSection {
    pub(crate) step: Option<i64>,
    pub(crate) tick_ms: Option<u64>,
    pub(crate) settle_delay_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub(crate) struct AnalyzeConfig {
    pub(crate) base_url: Option<String>,
    pub(crate) analyze_path: String,
    pub(crate) request_timeout: Duration,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RevealConfig {
    pub(crate) step: i64,
    pub(crate) tick: Duration,
    pub(crate) settle_delay: Duration,
}

pub(crate) fn load_dashboard_config(path: &Path) -> anyhow::Result<DashboardConfig> {
    if !path.exists() {
        return Ok(DashboardConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: DashboardConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

pub(crate) fn resolve_analyze_config(
    config: &DashboardConfig,
    base_url_override: Option<String>,
) -> AnalyzeConfig {
    let api = config.api.as_ref();
    let base_url = base_url_override
        .or_else(|| api.and_then(|section| section.base_url.clone()))
        .filter(|url| !url.trim().is_empty());
    let analyze_path = api
        .and_then(|section| section.analyze_path.clone())
        .unwrap_or_else(|| DEFAULT_ANALYZE_PATH.to_string());
    let timeout_ms = api
        .and_then(|section| section.request_timeout_ms)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
    AnalyzeConfig {
        base_url,
        analyze_path,
        request_timeout: Duration::from_millis(timeout_ms),
    }
}

pub(crate) fn resolve_reveal_config(config: &DashboardConfig) -> RevealConfig {
    let reveal = config.reveal.as_ref();
    let step = reveal.and_then(|section| section.step).unwrap_or(DEFAULT_REVEAL_STEP);
    let tick_ms = reveal
        .and_then(|section| section.tick_ms)
        .unwrap_or(DEFAULT_REVEAL_TICK_MS);
    let settle_delay_ms = reveal
        .and_then(|section| section.settle_delay_ms)
        .unwrap_or(DEFAULT_SETTLE_DELAY_MS);
    RevealConfig {
        // step below 1 would never converge on the target
        step: step.max(1),
        tick: Duration::from_millis(tick_ms.max(1)),
        settle_delay: Duration::from_millis(settle_delay_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let config = DashboardConfig::default();
        let analyze = resolve_analyze_config(&config, None);
        assert_eq!(analyze.base_url, None);
        assert_eq!(analyze.analyze_path, "/dashboard/analyze");
        assert_eq!(analyze.request_timeout, Duration::from_millis(10_000));
        let reveal = resolve_reveal_config(&config);
        assert_eq!(reveal.step, 2);
        assert_eq!(reveal.tick, Duration::from_millis(20));
        assert_eq!(reveal.settle_delay, Duration::from_millis(700));
    }

    #[test]
    fn parses_full_config() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://scoring.internal:8000"
            analyze_path = "/v2/analyze"
            request_timeout_ms = 3000

            [reveal]
            step = 5
            tick_ms = 10
            settle_delay_ms = 0
            "#,
        )
        .expect("parse");
        let analyze = resolve_analyze_config(&config, None);
        assert_eq!(
            analyze.base_url.as_deref(),
            Some("http://scoring.internal:8000")
        );
        assert_eq!(analyze.analyze_path, "/v2/analyze");
        assert_eq!(analyze.request_timeout, Duration::from_millis(3000));
        let reveal = resolve_reveal_config(&config);
        assert_eq!(reveal.step, 5);
        assert_eq!(reveal.tick, Duration::from_millis(10));
        assert!(reveal.settle_delay.is_zero());
    }

    #[test]
    fn cli_override_wins_over_config_file() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://from-file"
            "#,
        )
        .expect("parse");
        let analyze = resolve_analyze_config(&config, Some("http://from-flag".to_string()));
        assert_eq!(analyze.base_url.as_deref(), Some("http://from-flag"));
    }

    #[test]
    fn blank_base_url_counts_as_unset() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [api]
            base_url = "  "
            "#,
        )
        .expect("parse");
        let analyze = resolve_analyze_config(&config, None);
        assert_eq!(analyze.base_url, None);
    }

    #[test]
    fn reveal_step_is_clamped_to_at_least_one() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [reveal]
            step = 0
            "#,
        )
        .expect("parse");
        assert_eq!(resolve_reveal_config(&config).step, 1);
    }
}
