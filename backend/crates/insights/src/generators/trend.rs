//! Month-over-month and rolling-average movements, plus a cross-metric
//! leaderboard of the biggest movers.
//!
//! Direction words here follow the raw sign of the change. Unlike the
//! anomaly, milestone and comparison generators, polarity is not consulted.

use crate::insight::{Evidence, Insight, InsightKind, Severity};
use crate::series::{tail, values, SeriesPoint};
use crate::stats::{mean, pct_change};

use super::{fmt_value, AnalysisContext, InsightGenerator};

pub struct TrendGenerator;

struct Mover {
    metric_number: u32,
    change_pct: f64,
    previous: SeriesPoint,
    latest: SeriesPoint,
}

impl InsightGenerator for TrendGenerator {
    fn kind(&self) -> InsightKind {
        InsightKind::Trend
    }

    fn generate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let mut insights = Vec::new();
        let mut movers = Vec::new();

        for &metric in ctx.metric_numbers {
            let series = ctx.series(metric);
            if series.len() < 2 {
                continue;
            }

            if let Some(mover) = month_over_month(metric, &series) {
                if let Some(insight) = mom_insight(ctx, &mover, &series) {
                    insights.push(insight);
                }
                movers.push(mover);
            }

            insights.extend(rolling_insights(ctx, metric, &series));
        }

        if ctx.periods.len() >= 2 && ctx.metric_numbers.len() >= 2 {
            insights.extend(leaderboard(ctx, movers));
        }

        insights
    }
}

fn month_over_month(metric_number: u32, series: &[SeriesPoint]) -> Option<Mover> {
    let [previous, latest] = tail(series, 2) else {
        return None;
    };
    let change_pct = pct_change(previous.value, latest.value)?;
    Some(Mover {
        metric_number,
        change_pct,
        previous: previous.clone(),
        latest: latest.clone(),
    })
}

fn direction_word(change: f64) -> &'static str {
    if change > 0.0 {
        "improvement"
    } else {
        "decline"
    }
}

fn mom_insight(ctx: &AnalysisContext<'_>, mover: &Mover, series: &[SeriesPoint]) -> Option<Insight> {
    let t = ctx.thresholds;
    let change = mover.change_pct;
    if change.abs() <= t.mom_change_pct {
        return None;
    }

    let severity = if change.abs() > t.mom_warning_pct {
        Severity::Warning
    } else {
        Severity::Info
    };

    let metric = mover.metric_number;
    let insight = Insight::new(
        ctx.next_id(InsightKind::Trend, Some(metric), "mom"),
        InsightKind::Trend,
        format!(
            "Metric {metric}: {:.1}% month-over-month {}",
            change.abs(),
            direction_word(change)
        ),
        format!(
            "Metric {metric} moved from {} in {} to {} in {} ({change:+.1}%).",
            fmt_value(mover.previous.value),
            mover.previous.month,
            fmt_value(mover.latest.value),
            mover.latest.month,
        ),
    )
    .with_severity(severity)
    .with_metrics([metric])
    .with_range(mover.previous.month.clone(), mover.latest.month.clone())
    .with_evidence(Evidence::from_points(tail(series, 2)).with_change_pct(change));

    Some(insight)
}

/// Current value against the trailing 3- and 6-point means (both windows
/// include the current point).
fn rolling_insights(ctx: &AnalysisContext<'_>, metric: u32, series: &[SeriesPoint]) -> Vec<Insight> {
    let t = ctx.thresholds;
    let mut insights = Vec::new();
    let Some(current) = series.last() else {
        return insights;
    };

    let windows = [
        (3usize, t.rolling_3_pct, Some(t.rolling_3_warning_pct)),
        (6usize, t.rolling_6_pct, None),
    ];

    for (window, gate, warning) in windows {
        if series.len() < window {
            continue;
        }
        let recent = tail(series, window);
        let avg = mean(&values(recent));
        let Some(deviation) = pct_change(avg, current.value) else {
            continue;
        };
        if deviation.abs() <= gate {
            continue;
        }

        let severity = match warning {
            Some(w) if deviation.abs() > w => Severity::Warning,
            _ => Severity::Info,
        };
        let side = if deviation > 0.0 { "above" } else { "below" };

        insights.push(
            Insight::new(
                ctx.next_id(InsightKind::Trend, Some(metric), &format!("rolling{window}")),
                InsightKind::Trend,
                format!(
                    "Metric {metric}: {:.1}% {side} its {window}-month average",
                    deviation.abs()
                ),
                format!(
                    "The latest value {} ({}) is a {} against the {window}-month average of {:.2}.",
                    fmt_value(current.value),
                    current.month,
                    direction_word(deviation),
                    avg,
                ),
            )
            .with_severity(severity)
            .with_metrics([metric])
            .with_range(recent[0].month.clone(), current.month.clone())
            .with_evidence(
                Evidence::from_points(recent)
                    .with_change_pct(deviation)
                    .note(format!("{window}-month average: {avg:.2}")),
            ),
        );
    }

    insights
}

fn leaderboard(ctx: &AnalysisContext<'_>, mut movers: Vec<Mover>) -> Vec<Insight> {
    let t = ctx.thresholds;
    let mut insights = Vec::new();
    movers.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct));

    let improving: Vec<&Mover> = movers
        .iter()
        .filter(|m| m.change_pct > 0.0)
        .take(t.leaderboard_size)
        .collect();
    let declining: Vec<&Mover> = movers
        .iter()
        .rev()
        .filter(|m| m.change_pct < 0.0)
        .take(t.leaderboard_size)
        .collect();

    if !improving.is_empty() {
        insights.push(
            Insight::new(
                ctx.next_id(InsightKind::Trend, None, "top-improving"),
                InsightKind::Trend,
                "Top improving metrics",
                format!("Biggest month-over-month gains: {}.", mover_list(&improving)),
            )
            .with_severity(Severity::Info)
            .with_metrics(improving.iter().map(|m| m.metric_number))
            .with_evidence(mover_evidence(&improving)),
        );
    }

    if let Some(worst) = declining.first() {
        let severity = if worst.change_pct.abs() > t.leaderboard_warning_pct {
            Severity::Warning
        } else {
            Severity::Info
        };
        insights.push(
            Insight::new(
                ctx.next_id(InsightKind::Trend, None, "needs-attention"),
                InsightKind::Trend,
                "Metrics requiring attention",
                format!("Largest month-over-month declines: {}.", mover_list(&declining)),
            )
            .with_severity(severity)
            .with_metrics(declining.iter().map(|m| m.metric_number))
            .with_evidence(mover_evidence(&declining)),
        );
    }

    insights
}

fn mover_list(movers: &[&Mover]) -> String {
    movers
        .iter()
        .map(|m| format!("metric {} ({:+.1}%)", m.metric_number, m.change_pct))
        .collect::<Vec<_>>()
        .join(", ")
}

fn mover_evidence(movers: &[&Mover]) -> Evidence {
    movers.iter().fold(Evidence::default(), |ev, m| {
        ev.note(format!(
            "Metric {}: {} -> {} ({:+.1}%, {} to {})",
            m.metric_number,
            fmt_value(m.previous.value),
            fmt_value(m.latest.value),
            m.change_pct,
            m.previous.month,
            m.latest.month,
        ))
    })
}
