use kpiboard_common::error::{KpiboardError, KpiboardResult};
use kpiboard_config::AppConfig;
use kpiboard_insights::{
    generate_insights, top_by_severity, Insight, InsightKind, InsightOptions, InsightsConfig,
};

use super::dataset::Dataset;

pub struct InsightService {
    config: InsightsConfig,
    options: InsightOptions,
    top: usize,
}

impl InsightService {
    pub fn new(config: InsightsConfig, options: InsightOptions, top: usize) -> Self {
        Self {
            config,
            options,
            top,
        }
    }

    /// Build the engine settings from environment configuration.
    pub fn from_app_config(app: &AppConfig) -> KpiboardResult<Self> {
        let types = app
            .insight_types
            .iter()
            .map(|raw| {
                InsightKind::parse(raw)
                    .ok_or_else(|| KpiboardError::Config(format!("unknown insight type {raw:?}")))
            })
            .collect::<KpiboardResult<Vec<_>>>()?;

        let options = InsightOptions {
            time_range: app.time_range(),
            metric_numbers: None,
            types: (!types.is_empty()).then_some(types),
        };

        Ok(Self::new(
            InsightsConfig::with_catalog(app.metric_numbers.clone()),
            options,
            app.top_insights,
        ))
    }

    /// Run the engine over a validated dataset. A `top` of 0 keeps everything.
    pub fn run(&self, dataset: &Dataset) -> Vec<Insight> {
        tracing::info!(
            periods = dataset.periods.len(),
            finalised = dataset.finalised_count(),
            tolerances = dataset.tolerances.len(),
            "generating insights"
        );

        let insights = generate_insights(
            &self.config,
            &dataset.periods,
            &dataset.tolerances,
            &self.options,
        );

        if self.top > 0 && insights.len() > self.top {
            tracing::info!(total = insights.len(), kept = self.top, "capping insights by severity");
            return top_by_severity(insights, self.top);
        }
        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Months, NaiveDate};
    use kpiboard_insights::{MetricReading, ReportingPeriod, Severity};
    use uuid::Uuid;

    fn app_config(types: &[&str], top: usize) -> AppConfig {
        AppConfig {
            dataset_path: String::new(),
            metric_numbers: vec![1, 2],
            time_range_months: 0,
            insight_types: types.iter().map(|s| s.to_string()).collect(),
            top_insights: top,
            log_level: "info".to_owned(),
        }
    }

    fn dataset(values: &[f64]) -> Dataset {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let periods = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let start_date = base + Months::new(i as u32);
                ReportingPeriod {
                    id: Uuid::new_v4(),
                    label: None,
                    start_date,
                    end_date: start_date,
                    is_finalised: true,
                    metrics: vec![MetricReading::new(1, Some(*v))],
                }
            })
            .collect();
        Dataset {
            periods,
            tolerances: Vec::new(),
        }
    }

    #[test]
    fn unknown_insight_type_is_config_error() {
        let result = InsightService::from_app_config(&app_config(&["trend", "budget"], 0));
        assert!(matches!(result, Err(KpiboardError::Config(_))));
    }

    #[test]
    fn type_list_restricts_output() {
        let service = InsightService::from_app_config(&app_config(&["comparison"], 0)).unwrap();
        let insights = service.run(&dataset(&[80.0, 85.0]));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Comparison);
    }

    #[test]
    fn top_keeps_most_severe() {
        let service = InsightService::from_app_config(&app_config(&[], 1)).unwrap();
        let insights = service.run(&dataset(&[80.0, 82.0, 81.0, 83.0, 79.0, 20.0]));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Some(Severity::Critical));
    }

    #[test]
    fn empty_dataset_reports_insufficient_data() {
        let service = InsightService::from_app_config(&app_config(&[], 0)).unwrap();
        let insights = service.run(&Dataset::default());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Insufficient Data");
    }
}
