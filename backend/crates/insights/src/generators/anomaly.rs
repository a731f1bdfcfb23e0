//! Outlier detection on the most recent reading of each metric.
//!
//! Only deviations in the harmful direction are reported: a spike on a
//! lower-is-better metric, a drop on a higher-is-better one.

use crate::insight::{Evidence, Insight, InsightKind, Severity};
use crate::series::{values, SeriesPoint};
use crate::stats::{mean, quartiles, stddev, zscore};

use super::{fmt_value, AnalysisContext, InsightGenerator};

pub struct AnomalyGenerator;

const MIN_POINTS: usize = 3;
const ZSCORE_MIN_POINTS: usize = 6;
const IQR_MIN_POINTS: usize = 4;

const GENERIC_RECOMMENDATIONS: [&str; 2] = [
    "Confirm the reading was captured correctly for this period",
    "Review the underlying events with the control owner",
];

impl InsightGenerator for AnomalyGenerator {
    fn kind(&self) -> InsightKind {
        InsightKind::Anomaly
    }

    fn generate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let mut insights = Vec::new();

        for &metric in ctx.metric_numbers {
            let series = ctx.series(metric);
            if series.len() < MIN_POINTS {
                continue;
            }
            let lower_is_better = ctx.is_lower_better(metric);

            let by_zscore = zscore_insight(ctx, metric, &series, lower_is_better);
            let flagged = by_zscore.is_some();
            insights.extend(by_zscore);

            // One event, one report: the IQR view is only a fallback.
            if !flagged {
                insights.extend(iqr_insight(ctx, metric, &series, lower_is_better));
            }
        }

        insights
    }
}

fn recommendations(lower_is_better: bool) -> Vec<String> {
    let specific = if lower_is_better {
        "Find what pushed the value up and whether exposure has increased"
    } else {
        "Find what pulled the value down and whether coverage has degraded"
    };
    GENERIC_RECOMMENDATIONS
        .iter()
        .copied()
        .chain([specific])
        .map(str::to_owned)
        .collect()
}

fn zscore_insight(
    ctx: &AnalysisContext<'_>,
    metric: u32,
    series: &[SeriesPoint],
    lower_is_better: bool,
) -> Option<Insight> {
    let t = ctx.thresholds;
    if series.len() < ZSCORE_MIN_POINTS {
        return None;
    }
    let (latest, prior) = series.split_last()?;
    let history = values(prior);
    let z = zscore(latest.value, &history);

    let harmful = if lower_is_better {
        z > t.zscore
    } else {
        z < -t.zscore
    };
    if !harmful || z.abs() <= t.zscore {
        return None;
    }

    let severity = if z.abs() > t.zscore_critical {
        Severity::Critical
    } else {
        Severity::Warning
    };
    let (side, position) = if z > 0.0 {
        ("high", "above")
    } else {
        ("low", "below")
    };
    let avg = mean(&history);

    Some(
        Insight::new(
            ctx.next_id(InsightKind::Anomaly, Some(metric), "zscore"),
            InsightKind::Anomaly,
            format!("Metric {metric}: unusually {side} value in {}", latest.month),
            format!(
                "{} is {:.1} standard deviations {position} the historical mean of {avg:.2}.",
                fmt_value(latest.value),
                z.abs(),
            ),
        )
        .with_severity(severity)
        .with_metrics([metric])
        .with_range(series[0].month.clone(), latest.month.clone())
        .with_evidence(
            Evidence::from_points(series)
                .with_z_score(z)
                .note(format!(
                    "z-score {z:.2} against mean {avg:.2} and standard deviation {:.2}",
                    stddev(&history)
                )),
        )
        .with_recommendations(recommendations(lower_is_better)),
    )
}

fn iqr_insight(
    ctx: &AnalysisContext<'_>,
    metric: u32,
    series: &[SeriesPoint],
    lower_is_better: bool,
) -> Option<Insight> {
    if series.len() < IQR_MIN_POINTS {
        return None;
    }
    let (latest, prior) = series.split_last()?;
    let q = quartiles(&values(prior));
    let (lower, upper) = q.fences(ctx.thresholds.iqr_multiplier);

    let (side, bound) = if lower_is_better {
        if latest.value <= upper {
            return None;
        }
        ("above the upper", upper)
    } else {
        if latest.value >= lower {
            return None;
        }
        ("below the lower", lower)
    };

    Some(
        Insight::new(
            ctx.next_id(InsightKind::Anomaly, Some(metric), "iqr"),
            InsightKind::Anomaly,
            format!("Metric {metric}: outlier detected in {}", latest.month),
            format!(
                "{} falls {side} bound of {bound:.2} for this metric's history.",
                fmt_value(latest.value),
            ),
        )
        .with_severity(Severity::Warning)
        .with_metrics([metric])
        .with_range(series[0].month.clone(), latest.month.clone())
        .with_evidence(Evidence::from_points(series).note(format!(
            "Q1 {:.2}, Q3 {:.2}, IQR {:.2}",
            q.q1,
            q.q3,
            q.iqr()
        )))
        .with_recommendations(recommendations(lower_is_better)),
    )
}
