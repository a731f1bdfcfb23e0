//! Pairwise Pearson correlation across metrics over the months they share.

use std::collections::BTreeMap;

use crate::insight::{DataPoint, Evidence, Insight, InsightKind, Severity};
use crate::stats::pearson;

use super::{AnalysisContext, InsightGenerator};

pub struct CorrelationGenerator;

const CAVEAT: &str = "Correlation does not imply causation; treat this as a prompt for review";
const EVIDENCE_MONTHS: usize = 6;

impl InsightGenerator for CorrelationGenerator {
    fn kind(&self) -> InsightKind {
        InsightKind::Correlation
    }

    fn generate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let t = ctx.thresholds;
        if ctx.metric_numbers.len() < 2 {
            return Vec::new();
        }

        let retained: Vec<(u32, BTreeMap<String, f64>)> = ctx
            .metric_numbers
            .iter()
            .map(|&m| (m, ctx.series(m)))
            .filter(|(_, s)| s.len() >= t.correlation_min_points)
            .map(|(m, s)| (m, s.into_iter().map(|p| (p.month, p.value)).collect()))
            .collect();

        let Some((_, first)) = retained.first() else {
            return Vec::new();
        };
        let common: Vec<&String> = first
            .keys()
            .filter(|month| retained.iter().all(|(_, by_month)| by_month.contains_key(*month)))
            .collect();
        if retained.len() < 2 || common.len() < t.correlation_min_points {
            return Vec::new();
        }

        let aligned: Vec<(u32, Vec<f64>)> = retained
            .iter()
            .map(|(m, by_month)| (*m, common.iter().map(|month| by_month[*month]).collect()))
            .collect();

        let mut insights = Vec::new();
        for (i, (a, xs)) in aligned.iter().enumerate() {
            for (b, ys) in &aligned[i + 1..] {
                let r = pearson(xs, ys);
                if r.abs() <= t.correlation_min {
                    continue;
                }
                insights.push(pair_insight(ctx, (*a, xs.as_slice()), *b, r, &common));
            }
        }
        insights
    }
}

fn pair_insight(
    ctx: &AnalysisContext<'_>,
    (a, xs): (u32, &[f64]),
    b: u32,
    r: f64,
    common: &[&String],
) -> Insight {
    let relation = if r > 0.0 {
        "move together"
    } else {
        "move in opposite directions"
    };
    let start = common.len().saturating_sub(EVIDENCE_MONTHS);
    let points = common[start..]
        .iter()
        .zip(&xs[start..])
        .map(|(month, &value)| DataPoint {
            month: month.to_string(),
            value,
        })
        .collect();
    let first_month = common.first().map(|m| m.to_string()).unwrap_or_default();
    let last_month = common.last().map(|m| m.to_string()).unwrap_or_default();

    Insight::new(
        ctx.next_id(InsightKind::Correlation, Some(a), &format!("with-{b}")),
        InsightKind::Correlation,
        format!("Metrics {a} and {b} {relation} (r = {r:.2})"),
        format!(
            "Over {} shared months, metric {a} and metric {b} show a {} correlation of {r:.2}.",
            common.len(),
            if r.abs() > 0.9 { "very strong" } else { "strong" },
        ),
    )
    .with_severity(Severity::Info)
    .with_metrics([a, b])
    .with_range(first_month, last_month)
    .with_evidence(
        Evidence {
            data_points: points,
            ..Evidence::default()
        }
        .with_correlation(r)
        .note(CAVEAT),
    )
}
