use kpiboard_common::error::{KpiboardError, KpiboardResult};
use serde::Deserialize;
use std::env;

/// Metric numbers of the reference deployment.
pub const DEFAULT_METRIC_NUMBERS: &str = "1,2,3,4,5,6,7,8,9,10,11";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub dataset_path: String,
    pub metric_numbers: Vec<u32>,
    pub time_range_months: u32,
    pub insight_types: Vec<String>,
    pub top_insights: usize,
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads required vars.
    pub fn from_env() -> KpiboardResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            dataset_path: get_var("DATASET_PATH")?,
            metric_numbers: parse_list(
                "METRIC_NUMBERS",
                &get_var_or("METRIC_NUMBERS", DEFAULT_METRIC_NUMBERS),
            )?,
            time_range_months: get_var_or("TIME_RANGE_MONTHS", "0")
                .parse()
                .map_err(|e| KpiboardError::Config(format!("invalid TIME_RANGE_MONTHS: {e}")))?,
            insight_types: split_list(&get_var_or("INSIGHT_TYPES", "")),
            top_insights: get_var_or("TOP_INSIGHTS", "0")
                .parse()
                .map_err(|e| KpiboardError::Config(format!("invalid TOP_INSIGHTS: {e}")))?,
            log_level: get_var_or("LOG_LEVEL", "info"),
        })
    }

    /// `None` when no trailing window was configured.
    pub fn time_range(&self) -> Option<u32> {
        (self.time_range_months > 0).then_some(self.time_range_months)
    }
}

fn get_var(key: &str) -> KpiboardResult<String> {
    env::var(key).map_err(|_| KpiboardError::Config(format!("{key} is required but not set")))
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_list(key: &str, raw: &str) -> KpiboardResult<Vec<u32>> {
    let numbers = split_list(raw)
        .iter()
        .map(|s| {
            s.parse::<u32>()
                .map_err(|e| KpiboardError::Config(format!("invalid {key} entry {s:?}: {e}")))
        })
        .collect::<KpiboardResult<Vec<_>>>()?;

    if numbers.is_empty() {
        return Err(KpiboardError::Config(format!(
            "{key} must list at least one metric"
        )));
    }
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_optional_vars() {
        for key in [
            "METRIC_NUMBERS",
            "TIME_RANGE_MONTHS",
            "INSIGHT_TYPES",
            "TOP_INSIGHTS",
            "LOG_LEVEL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn config_from_env_succeeds_with_required_vars() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_optional_vars();

        env::set_var("DATASET_PATH", "/tmp/kpiboard/dataset.json");

        let cfg = AppConfig::from_env().expect("should parse config");
        assert_eq!(cfg.dataset_path, "/tmp/kpiboard/dataset.json");
        assert_eq!(cfg.metric_numbers, (1..=11).collect::<Vec<u32>>());
        assert_eq!(cfg.time_range_months, 0);
        assert_eq!(cfg.time_range(), None);
        assert!(cfg.insight_types.is_empty());
        assert_eq!(cfg.top_insights, 0);
        assert_eq!(cfg.log_level, "info");

        env::remove_var("DATASET_PATH");
    }

    #[test]
    fn config_from_env_fails_without_dataset_path() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::remove_var("DATASET_PATH");
        let result = AppConfig::from_env();
        assert!(result.is_err());
    }

    #[test]
    fn config_reads_metric_catalog_and_window() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_optional_vars();

        env::set_var("DATASET_PATH", "data.json");
        env::set_var("METRIC_NUMBERS", "2, 4,12");
        env::set_var("TIME_RANGE_MONTHS", "6");
        env::set_var("INSIGHT_TYPES", "trend,anomaly");
        env::set_var("LOG_LEVEL", "kpiboard_insights=debug");

        let cfg = AppConfig::from_env().expect("should parse config");
        assert_eq!(cfg.log_level, "kpiboard_insights=debug");
        assert_eq!(cfg.metric_numbers, vec![2, 4, 12]);
        assert_eq!(cfg.time_range(), Some(6));
        assert_eq!(cfg.insight_types, vec!["trend", "anomaly"]);

        clear_optional_vars();
        env::remove_var("DATASET_PATH");
    }

    #[test]
    fn config_rejects_bad_metric_number() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_optional_vars();

        env::set_var("DATASET_PATH", "data.json");
        env::set_var("METRIC_NUMBERS", "1,two");

        let result = AppConfig::from_env();
        assert!(matches!(result, Err(KpiboardError::Config(_))));

        clear_optional_vars();
        env::remove_var("DATASET_PATH");
    }

    #[test]
    fn empty_metric_catalog_is_rejected() {
        assert!(parse_list("METRIC_NUMBERS", " , ").is_err());
    }
}
