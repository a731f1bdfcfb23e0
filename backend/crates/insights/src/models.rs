use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single monthly reading of one metric inside a reporting period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricReading {
    pub metric_number: u32,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, rename = "isNA")]
    pub is_na: bool,
    /// Hidden readings are left out of reports but still feed analytics.
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub insight: Option<String>,
}

impl MetricReading {
    pub fn new(metric_number: u32, value: Option<f64>) -> Self {
        Self {
            metric_number,
            value,
            is_na: false,
            is_hidden: false,
            insight: None,
        }
    }

    pub fn not_applicable(metric_number: u32) -> Self {
        Self {
            is_na: true,
            ..Self::new(metric_number, None)
        }
    }

    /// The value the engine may analyse, if any.
    pub fn usable_value(&self) -> Option<f64> {
        if self.is_na {
            None
        } else {
            self.value
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingPeriod {
    pub id: Uuid,
    #[serde(default)]
    pub label: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_finalised: bool,
    #[serde(default)]
    pub metrics: Vec<MetricReading>,
}

impl ReportingPeriod {
    pub fn reading(&self, metric_number: u32) -> Option<&MetricReading> {
        self.metrics.iter().find(|m| m.metric_number == metric_number)
    }

    pub fn usable_value(&self, metric_number: u32) -> Option<f64> {
        self.reading(metric_number).and_then(MetricReading::usable_value)
    }

    /// `YYYY-MM` of the period start.
    pub fn month_key(&self) -> String {
        self.start_date.format("%Y-%m").to_string()
    }
}
