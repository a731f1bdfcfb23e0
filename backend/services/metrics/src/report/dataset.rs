use std::collections::HashSet;
use std::path::Path;

use kpiboard_common::error::{KpiboardError, KpiboardResult};
use kpiboard_insights::{ReportingPeriod, ToleranceBand};
use serde::Deserialize;

/// Periods and tolerance bands exported by the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub periods: Vec<ReportingPeriod>,
    #[serde(default)]
    pub tolerances: Vec<ToleranceBand>,
}

impl Dataset {
    pub async fn load(path: impl AsRef<Path>) -> KpiboardResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| KpiboardError::Dataset(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> KpiboardResult<Self> {
        serde_json::from_str(raw).map_err(|e| KpiboardError::Dataset(format!("invalid JSON: {e}")))
    }

    /// Shape checks the engine relies on the caller for.
    pub fn validate(&self) -> KpiboardResult<()> {
        let mut seen = HashSet::new();
        for band in &self.tolerances {
            if !seen.insert(band.metric_number) {
                return Err(KpiboardError::Validation(format!(
                    "duplicate tolerance record for metric {}",
                    band.metric_number
                )));
            }
        }

        for period in &self.periods {
            if period.end_date < period.start_date {
                return Err(KpiboardError::Validation(format!(
                    "period {} ends before it starts",
                    period.id
                )));
            }
            if let Some(reading) = period.metrics.iter().find(|m| m.is_na && m.value.is_some()) {
                return Err(KpiboardError::Validation(format!(
                    "metric {} in period {} is marked NA but carries a value",
                    reading.metric_number, period.id
                )));
            }
        }

        Ok(())
    }

    pub fn finalised_count(&self) -> usize {
        self.periods.iter().filter(|p| p.is_finalised).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "periods": [
            {
                "id": "0b9f4a7e-2a8c-4b8e-9f39-1e0f5d6c7a01",
                "startDate": "2024-01-01",
                "endDate": "2024-01-31",
                "isFinalised": true,
                "metrics": [
                    { "metricNumber": 1, "value": 80, "isNA": false },
                    { "metricNumber": 2, "value": null, "isNA": true }
                ]
            },
            {
                "id": "0b9f4a7e-2a8c-4b8e-9f39-1e0f5d6c7a02",
                "startDate": "2024-02-01",
                "endDate": "2024-02-29",
                "isFinalised": false,
                "metrics": [
                    { "metricNumber": 1, "value": 85, "isNA": false }
                ]
            }
        ],
        "tolerances": [
            {
                "metricNumber": 1,
                "greenMin": 90, "greenMax": null, "greenOperator": ">=",
                "amberMin": 75, "amberMax": 90, "amberOperator": "range",
                "redMin": null, "redMax": 75, "redOperator": "<=",
                "isLowerBetter": false,
                "flatTolerance": 1
            }
        ]
    }"#;

    #[test]
    fn parses_dashboard_export() {
        let dataset = Dataset::parse(SAMPLE).unwrap();
        assert_eq!(dataset.periods.len(), 2);
        assert_eq!(dataset.tolerances.len(), 1);
        assert_eq!(dataset.finalised_count(), 1);
        assert!(dataset.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_json() {
        let result = Dataset::parse("{ \"periods\": [");
        assert!(matches!(result, Err(KpiboardError::Dataset(_))));
    }

    #[test]
    fn duplicate_tolerance_is_invalid() {
        let mut dataset = Dataset::parse(SAMPLE).unwrap();
        let dup = dataset.tolerances[0].clone();
        dataset.tolerances.push(dup);
        assert!(matches!(
            dataset.validate(),
            Err(KpiboardError::Validation(_))
        ));
    }

    #[test]
    fn na_with_value_is_invalid() {
        let mut dataset = Dataset::parse(SAMPLE).unwrap();
        dataset.periods[0].metrics[1].value = Some(3.0);
        let err = dataset.validate().unwrap_err();
        assert!(err.to_string().contains("marked NA"));
    }

    #[test]
    fn inverted_period_is_invalid() {
        let mut dataset = Dataset::parse(SAMPLE).unwrap();
        dataset.periods[1].end_date = dataset.periods[1].start_date.pred_opt().unwrap();
        assert!(dataset.validate().is_err());
    }

    #[tokio::test]
    async fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("kpiboard-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, SAMPLE).await.unwrap();

        let dataset = Dataset::load(&path).await.unwrap();
        assert_eq!(dataset.periods.len(), 2);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn load_missing_file_is_dataset_error() {
        let result = Dataset::load("/nonexistent/kpiboard/dataset.json").await;
        assert!(matches!(result, Err(KpiboardError::Dataset(_))));
    }
}
