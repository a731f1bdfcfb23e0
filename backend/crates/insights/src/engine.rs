use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::InsightsConfig;
use crate::generators::{generator_for, AnalysisContext};
use crate::insight::{Insight, InsightIds, InsightKind, Severity};
use crate::models::ReportingPeriod;
use crate::tolerance::ToleranceBand;

/// Per-request knobs. Absent or empty fields fall back to "everything".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightOptions {
    /// Trailing window in months; `None` or 0 means all time.
    #[serde(default)]
    pub time_range: Option<u32>,
    #[serde(default)]
    pub metric_numbers: Option<Vec<u32>>,
    #[serde(default)]
    pub types: Option<Vec<InsightKind>>,
}

impl InsightOptions {
    fn wants(&self, kind: InsightKind) -> bool {
        match self.types.as_deref() {
            Some(types) if !types.is_empty() => types.contains(&kind),
            _ => true,
        }
    }
}

/// Run every requested generator over the finalised periods in the window.
///
/// Results are concatenated in generator declaration order (trend, anomaly,
/// milestone, comparison, forecast, correlation). With no finalised period
/// left after filtering a single "Insufficient Data" insight is returned.
pub fn generate_insights(
    config: &InsightsConfig,
    periods: &[ReportingPeriod],
    tolerances: &[ToleranceBand],
    options: &InsightOptions,
) -> Vec<Insight> {
    let ids = InsightIds::new();
    let selected = select_periods(periods, options.time_range);

    tracing::debug!(
        supplied = periods.len(),
        selected = selected.len(),
        time_range = ?options.time_range,
        "filtered reporting periods"
    );

    if selected.is_empty() {
        return vec![insufficient_data(&ids)];
    }

    let metric_numbers = match options.metric_numbers.as_deref() {
        Some(m) if !m.is_empty() => m,
        _ => config.metric_catalog.as_slice(),
    };

    let ctx = AnalysisContext {
        periods: &selected,
        tolerances,
        metric_numbers,
        thresholds: &config.thresholds,
        ids: &ids,
    };

    let mut insights = Vec::new();
    for kind in InsightKind::ALL.into_iter().filter(|k| options.wants(*k)) {
        let found = generator_for(kind).generate(&ctx);
        tracing::debug!(kind = kind.as_str(), count = found.len(), "generator finished");
        insights.extend(found);
    }
    insights
}

/// Apply the trailing window, then keep finalised periods, oldest first.
///
/// The window is anchored on the newest start date across every supplied
/// period, drafts included, and floored to the first of the month.
pub(crate) fn select_periods(
    periods: &[ReportingPeriod],
    time_range: Option<u32>,
) -> Vec<ReportingPeriod> {
    let cutoff = time_range
        .filter(|months| *months > 0)
        .and_then(|months| window_start(periods, months));

    let mut selected: Vec<ReportingPeriod> = periods
        .iter()
        .filter(|p| cutoff.map_or(true, |c| p.start_date >= c))
        .filter(|p| p.is_finalised)
        .cloned()
        .collect();
    selected.sort_by_key(|p| p.start_date);
    selected
}

fn window_start(periods: &[ReportingPeriod], months: u32) -> Option<NaiveDate> {
    let latest = periods.iter().map(|p| p.start_date).max()?;
    latest
        .checked_sub_months(Months::new(months))
        .and_then(|d| d.with_day(1))
}

fn insufficient_data(ids: &InsightIds) -> Insight {
    Insight::new(
        ids.next(InsightKind::Trend, None, "insufficient-data"),
        InsightKind::Trend,
        "Insufficient Data",
        "No finalised reporting periods fall within the selected time range. \
         Finalise at least one period to generate insights.",
    )
    .with_severity(Severity::Info)
}

/// Most severe first, stable within a severity, capped at `limit`.
pub fn top_by_severity(mut insights: Vec<Insight>, limit: usize) -> Vec<Insight> {
    insights.sort_by(|a, b| b.severity.cmp(&a.severity));
    insights.truncate(limit);
    insights
}
