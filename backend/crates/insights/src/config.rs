use serde::{Deserialize, Serialize};

/// Every numeric gate the generators apply. Percentages are in percent
/// units (5.0 means 5 %).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    pub mom_change_pct: f64,
    pub mom_warning_pct: f64,
    pub rolling_3_pct: f64,
    pub rolling_3_warning_pct: f64,
    pub rolling_6_pct: f64,
    pub leaderboard_size: usize,
    pub leaderboard_warning_pct: f64,
    pub zscore: f64,
    pub zscore_critical: f64,
    pub iqr_multiplier: f64,
    pub milestone_window: usize,
    pub streak_min: usize,
    pub yoy_change_pct: f64,
    pub yoy_warning_pct: f64,
    pub forecast_divergence: f64,
    pub correlation_min: f64,
    pub correlation_min_points: usize,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            mom_change_pct: 5.0,
            mom_warning_pct: 20.0,
            rolling_3_pct: 10.0,
            rolling_3_warning_pct: 20.0,
            rolling_6_pct: 15.0,
            leaderboard_size: 3,
            leaderboard_warning_pct: 10.0,
            zscore: 2.0,
            zscore_critical: 3.0,
            iqr_multiplier: 1.5,
            milestone_window: 12,
            streak_min: 4,
            yoy_change_pct: 10.0,
            yoy_warning_pct: 25.0,
            forecast_divergence: 5.0,
            correlation_min: 0.7,
            correlation_min_points: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Metric numbers analysed when a request does not name any.
    pub metric_catalog: Vec<u32>,
    pub thresholds: InsightThresholds,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            metric_catalog: (1..=11).collect(),
            thresholds: InsightThresholds::default(),
        }
    }
}

impl InsightsConfig {
    pub fn with_catalog(metric_catalog: Vec<u32>) -> Self {
        Self {
            metric_catalog,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_reference_deployment() {
        let cfg = InsightsConfig::default();
        assert_eq!(cfg.metric_catalog, (1..=11).collect::<Vec<u32>>());
    }

    #[test]
    fn default_thresholds_are_ordered() {
        let t = InsightThresholds::default();
        assert!(t.mom_warning_pct > t.mom_change_pct);
        assert!(t.yoy_warning_pct > t.yoy_change_pct);
        assert!(t.zscore_critical > t.zscore);
        assert!(t.correlation_min > 0.0 && t.correlation_min < 1.0);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: InsightsConfig =
            serde_json::from_str(r#"{ "thresholds": { "zscore": 2.5 } }"#).unwrap();
        assert_eq!(cfg.metric_catalog.len(), 11);
        assert!((cfg.thresholds.zscore - 2.5).abs() < f64::EPSILON);
        assert!((cfg.thresholds.iqr_multiplier - 1.5).abs() < f64::EPSILON);
    }
}
