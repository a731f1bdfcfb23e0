//! Latest period against the previous one and against the same month a
//! year earlier.

use chrono::{Datelike, Months};

use crate::insight::{DataPoint, Evidence, Insight, InsightKind, Severity};
use crate::models::ReportingPeriod;
use crate::stats::pct_change;

use super::{fmt_value, AnalysisContext, InsightGenerator};

pub struct ComparisonGenerator;

struct Gates {
    emit_pct: f64,
    warning_pct: f64,
}

impl InsightGenerator for ComparisonGenerator {
    fn kind(&self) -> InsightKind {
        InsightKind::Comparison
    }

    fn generate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let mut newest_first: Vec<&ReportingPeriod> = ctx.periods.iter().collect();
        newest_first.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        let [current, previous, ..] = newest_first.as_slice() else {
            return Vec::new();
        };
        let year_ago = year_ago_period(ctx.periods, current);

        let t = ctx.thresholds;
        let mom = Gates {
            emit_pct: t.mom_change_pct,
            warning_pct: t.mom_warning_pct,
        };
        let yoy = Gates {
            emit_pct: t.yoy_change_pct,
            warning_pct: t.yoy_warning_pct,
        };

        let mut insights = Vec::new();
        for &metric in ctx.metric_numbers {
            insights.extend(compare(ctx, metric, previous, current, &mom, "mom"));
            if let Some(base) = year_ago {
                insights.extend(compare(ctx, metric, base, current, &yoy, "yoy"));
            }
        }
        insights
    }
}

/// The period whose start month is exactly twelve months before `current`.
fn year_ago_period<'a>(
    periods: &'a [ReportingPeriod],
    current: &ReportingPeriod,
) -> Option<&'a ReportingPeriod> {
    let target = current.start_date.checked_sub_months(Months::new(12))?;
    periods
        .iter()
        .find(|p| p.start_date.year() == target.year() && p.start_date.month() == target.month())
}

fn compare(
    ctx: &AnalysisContext<'_>,
    metric: u32,
    base: &ReportingPeriod,
    current: &ReportingPeriod,
    gates: &Gates,
    suffix: &str,
) -> Option<Insight> {
    let before = base.usable_value(metric)?;
    let after = current.usable_value(metric)?;
    let change = pct_change(before, after)?;
    if change.abs() <= gates.emit_pct {
        return None;
    }

    let severity = if change.abs() > gates.warning_pct {
        Severity::Warning
    } else {
        Severity::Info
    };
    let improved = (change > 0.0) != ctx.is_lower_better(metric);
    let verb = if improved { "improved" } else { "worsened" };
    let span = if suffix == "yoy" {
        "year-over-year"
    } else {
        "month-over-month"
    };
    let (from, to) = (base.month_key(), current.month_key());

    Some(
        Insight::new(
            ctx.next_id(InsightKind::Comparison, Some(metric), suffix),
            InsightKind::Comparison,
            format!("Metric {metric} {verb} {:.1}% {span}", change.abs()),
            format!(
                "Metric {metric} went from {} ({from}) to {} ({to}), a {change:+.1}% change.",
                fmt_value(before),
                fmt_value(after),
            ),
        )
        .with_severity(severity)
        .with_metrics([metric])
        .with_range(from.clone(), to.clone())
        .with_evidence(
            Evidence {
                data_points: vec![
                    DataPoint {
                        month: from,
                        value: before,
                    },
                    DataPoint {
                        month: to,
                        value: after,
                    },
                ],
                ..Evidence::default()
            }
            .with_change_pct(change),
        ),
    )
}
