//! Per-metric time series, oldest first.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ReportingPeriod;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub month: String,
    pub value: f64,
    pub period_id: Uuid,
}

/// Collect the usable readings of `metric_number`, ordered by period start.
///
/// Periods without a reading, with an NA reading or with a null value are
/// skipped. Missing months are not filled in.
pub fn build_series(periods: &[ReportingPeriod], metric_number: u32) -> Vec<SeriesPoint> {
    let mut ordered: Vec<&ReportingPeriod> = periods.iter().collect();
    ordered.sort_by_key(|p| p.start_date);

    ordered
        .into_iter()
        .filter_map(|p| {
            p.usable_value(metric_number).map(|value| SeriesPoint {
                month: p.month_key(),
                value,
                period_id: p.id,
            })
        })
        .collect()
}

pub fn values(series: &[SeriesPoint]) -> Vec<f64> {
    series.iter().map(|p| p.value).collect()
}

/// The last `n` points (or fewer when the series is shorter).
pub fn tail(series: &[SeriesPoint], n: usize) -> &[SeriesPoint] {
    &series[series.len().saturating_sub(n)..]
}
