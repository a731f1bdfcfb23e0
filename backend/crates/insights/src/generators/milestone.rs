//! New highs and lows, sustained streaks and tolerance-zone crossings.

use crate::insight::{Evidence, Insight, InsightKind, Severity};
use crate::series::{tail, SeriesPoint};
use crate::tolerance::ToleranceBand;

use super::{fmt_value, AnalysisContext, InsightGenerator};

pub struct MilestoneGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Streak {
    step: Step,
    len: usize,
    start: usize,
    end: usize,
}

impl InsightGenerator for MilestoneGenerator {
    fn kind(&self) -> InsightKind {
        InsightKind::Milestone
    }

    fn generate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let mut insights = Vec::new();

        for &metric in ctx.metric_numbers {
            let series = ctx.series(metric);
            if series.len() < 2 {
                continue;
            }
            let lower_is_better = ctx.is_lower_better(metric);

            if series.len() >= 3 {
                insights.extend(extreme_insights(ctx, metric, &series, lower_is_better));
                insights.extend(streak_insight(ctx, metric, &series, lower_is_better));
            }
            insights.extend(zone_insights(ctx, metric, &series));
        }

        insights
    }
}

fn verdict(good: bool) -> (&'static str, Severity) {
    if good {
        ("positive achievement", Severity::Info)
    } else {
        ("requires attention", Severity::Warning)
    }
}

fn extreme_insights(
    ctx: &AnalysisContext<'_>,
    metric: u32,
    series: &[SeriesPoint],
    lower_is_better: bool,
) -> Vec<Insight> {
    let window = ctx.thresholds.milestone_window;
    let recent = tail(series, window);
    let Some(latest) = recent.last() else {
        return Vec::new();
    };

    let max = recent.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let min = recent.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);

    let candidates = [
        (latest.value == max, "high", "highest", !lower_is_better),
        (latest.value == min, "low", "lowest", lower_is_better),
    ];

    candidates
        .into_iter()
        .filter(|(hit, ..)| *hit)
        .map(|(_, label, superlative, good)| {
            let (tag, severity) = verdict(good);
            Insight::new(
                ctx.next_id(InsightKind::Milestone, Some(metric), label),
                InsightKind::Milestone,
                format!("Metric {metric}: new {window}-month {label}"),
                format!(
                    "{} in {} is the {superlative} value of the last {} months ({tag}).",
                    fmt_value(latest.value),
                    latest.month,
                    recent.len(),
                ),
            )
            .with_severity(severity)
            .with_metrics([metric])
            .with_range(recent[0].month.clone(), latest.month.clone())
            .with_evidence(Evidence::from_points(recent).note(tag))
        })
        .collect()
}

/// Longest run of strictly monotonic steps, scanning from the newest point
/// backwards. A flat step breaks the run. Lengths count points, not steps.
fn longest_streak(values: &[f64]) -> Option<Streak> {
    let mut best: Option<Streak> = None;
    let mut current: Option<Streak> = None;

    for i in (1..values.len()).rev() {
        let delta = values[i] - values[i - 1];
        let step = if delta > 0.0 {
            Some(Step::Up)
        } else if delta < 0.0 {
            Some(Step::Down)
        } else {
            None
        };

        current = match (step, current) {
            (None, _) => None,
            (Some(s), Some(run)) if run.step == s => Some(Streak {
                len: run.len + 1,
                start: i - 1,
                ..run
            }),
            (Some(s), _) => Some(Streak {
                step: s,
                len: 2,
                start: i - 1,
                end: i,
            }),
        };

        if let Some(run) = current {
            if best.map_or(true, |b| run.len > b.len) {
                best = Some(run);
            }
        }
    }

    best
}

fn streak_insight(
    ctx: &AnalysisContext<'_>,
    metric: u32,
    series: &[SeriesPoint],
    lower_is_better: bool,
) -> Option<Insight> {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let streak = longest_streak(&values)?;
    if streak.len < ctx.thresholds.streak_min {
        return None;
    }

    let good = match streak.step {
        Step::Up => !lower_is_better,
        Step::Down => lower_is_better,
    };
    let (tag, severity) = verdict(good);
    let word = match streak.step {
        Step::Up => "rising",
        Step::Down => "falling",
    };
    let run = &series[streak.start..=streak.end];

    Some(
        Insight::new(
            ctx.next_id(InsightKind::Milestone, Some(metric), "streak"),
            InsightKind::Milestone,
            format!("Metric {metric}: {}-month {word} streak", streak.len),
            format!(
                "Metric {metric} moved the same way for {} consecutive months from {} to {} ({tag}).",
                streak.len,
                run[0].month,
                run[run.len() - 1].month,
            ),
        )
        .with_severity(severity)
        .with_metrics([metric])
        .with_range(run[0].month.clone(), run[run.len() - 1].month.clone())
        .with_evidence(Evidence::from_points(run).note(tag)),
    )
}

fn zone_insights(ctx: &AnalysisContext<'_>, metric: u32, series: &[SeriesPoint]) -> Vec<Insight> {
    let mut insights = Vec::new();
    let Some(band) = ctx.band(metric) else {
        return insights;
    };
    let [previous, current] = tail(series, 2) else {
        return insights;
    };

    let inside = |(lo, hi): (f64, f64), v: f64| v >= lo && v <= hi;
    let entered = |zone: (f64, f64)| !inside(zone, previous.value) && inside(zone, current.value);

    if let Some(zone) = band.green_zone().filter(|z| entered(*z)) {
        insights.push(
            Insight::new(
                ctx.next_id(InsightKind::Milestone, Some(metric), "green-zone"),
                InsightKind::Milestone,
                format!("Metric {metric}: entered green zone"),
                format!(
                    "{} in {} is back within the target range {}-{}.",
                    fmt_value(current.value),
                    current.month,
                    fmt_value(zone.0),
                    fmt_value(zone.1),
                ),
            )
            .with_severity(Severity::Info)
            .with_metrics([metric])
            .with_range(previous.month.clone(), current.month.clone())
            .with_evidence(
                Evidence::from_points([previous, current]).note(status_note(band, previous)),
            ),
        );
    }

    if let Some(zone) = band.red_zone().filter(|z| entered(*z)) {
        insights.push(
            Insight::new(
                ctx.next_id(InsightKind::Milestone, Some(metric), "red-zone"),
                InsightKind::Milestone,
                format!("Metric {metric}: entered red zone"),
                format!(
                    "{} in {} has fallen into the red range {}-{}.",
                    fmt_value(current.value),
                    current.month,
                    fmt_value(zone.0),
                    fmt_value(zone.1),
                ),
            )
            .with_severity(Severity::Critical)
            .with_metrics([metric])
            .with_range(previous.month.clone(), current.month.clone())
            .with_evidence(
                Evidence::from_points([previous, current]).note(status_note(band, previous)),
            )
            .with_recommendations([
                "Escalate to the metric owner and agree a remediation plan",
                "Track the metric weekly until it leaves the red zone",
            ]),
        );
    }

    insights
}

fn status_note(band: &ToleranceBand, previous: &SeriesPoint) -> String {
    format!(
        "rated {} in {}",
        band.evaluate(previous.value).as_str(),
        previous.month
    )
}
