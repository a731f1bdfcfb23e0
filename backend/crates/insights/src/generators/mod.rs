pub mod anomaly;
pub mod comparison;
pub mod correlation;
pub mod forecast;
pub mod milestone;
pub mod trend;

use crate::config::InsightThresholds;
use crate::insight::{Insight, InsightIds, InsightKind};
use crate::models::ReportingPeriod;
use crate::series::{build_series, SeriesPoint};
use crate::tolerance::{self, ToleranceBand};

use anomaly::AnomalyGenerator;
use comparison::ComparisonGenerator;
use correlation::CorrelationGenerator;
use forecast::ForecastGenerator;
use milestone::MilestoneGenerator;
use trend::TrendGenerator;

/// Read-only inputs shared by every generator in one run.
pub struct AnalysisContext<'a> {
    /// Finalised periods inside the requested window, oldest first.
    pub periods: &'a [ReportingPeriod],
    pub tolerances: &'a [ToleranceBand],
    pub metric_numbers: &'a [u32],
    pub thresholds: &'a InsightThresholds,
    pub ids: &'a InsightIds,
}

impl AnalysisContext<'_> {
    pub fn series(&self, metric_number: u32) -> Vec<SeriesPoint> {
        build_series(self.periods, metric_number)
    }

    pub fn band(&self, metric_number: u32) -> Option<&ToleranceBand> {
        tolerance::find_band(self.tolerances, metric_number)
    }

    pub fn is_lower_better(&self, metric_number: u32) -> bool {
        tolerance::is_lower_better(self.tolerances, metric_number)
    }

    pub fn next_id(&self, kind: InsightKind, metric: Option<u32>, suffix: &str) -> String {
        self.ids.next(kind, metric, suffix)
    }
}

pub trait InsightGenerator {
    fn kind(&self) -> InsightKind;
    fn generate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight>;
}

pub fn generator_for(kind: InsightKind) -> Box<dyn InsightGenerator> {
    match kind {
        InsightKind::Trend => Box::new(TrendGenerator),
        InsightKind::Anomaly => Box::new(AnomalyGenerator),
        InsightKind::Milestone => Box::new(MilestoneGenerator),
        InsightKind::Comparison => Box::new(ComparisonGenerator),
        InsightKind::Forecast => Box::new(ForecastGenerator),
        InsightKind::Correlation => Box::new(CorrelationGenerator),
    }
}

/// Format a value the way report tables show it.
pub(crate) fn fmt_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}
