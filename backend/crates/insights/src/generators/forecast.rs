//! One-step-ahead projections. Both methods are naive and labelled as
//! low confidence.

use chrono::{Months, NaiveDate};

use crate::insight::{Evidence, Insight, InsightKind, Severity};
use crate::series::{tail, values, SeriesPoint};
use crate::stats::{linear_regression, mean};

use super::{fmt_value, AnalysisContext, InsightGenerator};

pub struct ForecastGenerator;

const MIN_POINTS: usize = 3;
const LINEAR_MIN_POINTS: usize = 6;
const LOW_CONFIDENCE: &str = "Low confidence: naive projection, not a statistical forecast";

impl InsightGenerator for ForecastGenerator {
    fn kind(&self) -> InsightKind {
        InsightKind::Forecast
    }

    fn generate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let mut insights = Vec::new();

        for &metric in ctx.metric_numbers {
            let series = ctx.series(metric);
            if series.len() < MIN_POINTS {
                continue;
            }
            let target = next_month(&series);

            let recent = tail(&series, 3);
            let moving_average = mean(&values(recent));
            insights.push(moving_average_insight(ctx, metric, &series, &target, moving_average));

            if series.len() >= LINEAR_MIN_POINTS {
                let fit = linear_regression(&values(&series));
                let projected = fit.predict(series.len() as f64);
                if (projected - moving_average).abs() > ctx.thresholds.forecast_divergence {
                    insights.push(
                        Insight::new(
                            ctx.next_id(InsightKind::Forecast, Some(metric), "linear"),
                            InsightKind::Forecast,
                            format!("Metric {metric}: linear trend projects {projected:.2} for {target}"),
                            format!(
                                "A straight-line fit over {} months (slope {:+.2} per month) points to {projected:.2}, \
                                 away from the moving-average estimate of {moving_average:.2}.",
                                series.len(),
                                fit.slope,
                            ),
                        )
                        .with_severity(Severity::Info)
                        .with_metrics([metric])
                        .with_range(series[0].month.clone(), target.clone())
                        .with_evidence(
                            Evidence::from_points(&series)
                                .with_projection(projected)
                                .note(LOW_CONFIDENCE)
                                .note(format!(
                                    "slope {:.4}, intercept {:.4}",
                                    fit.slope, fit.intercept
                                )),
                        ),
                    );
                }
            }
        }

        insights
    }
}

fn moving_average_insight(
    ctx: &AnalysisContext<'_>,
    metric: u32,
    series: &[SeriesPoint],
    target: &str,
    moving_average: f64,
) -> Insight {
    let recent = tail(series, 3);
    let direction = match tail(series, 2) {
        [prev, last] if last.value > prev.value => "rising",
        [prev, last] if last.value < prev.value => "falling",
        _ => "flat",
    };

    Insight::new(
        ctx.next_id(InsightKind::Forecast, Some(metric), "ma"),
        InsightKind::Forecast,
        format!("Metric {metric}: expected around {moving_average:.2} in {target}"),
        format!(
            "The 3-month moving average is {moving_average:.2}; the latest reading of {} is {direction}.",
            fmt_value(series[series.len() - 1].value),
        ),
    )
    .with_severity(Severity::Info)
    .with_metrics([metric])
    .with_range(recent[0].month.clone(), target.to_string())
    .with_evidence(
        Evidence::from_points(recent)
            .with_projection(moving_average)
            .note(LOW_CONFIDENCE),
    )
}

/// `YYYY-MM` of the month after the last point.
fn next_month(series: &[SeriesPoint]) -> String {
    series
        .last()
        .and_then(|p| NaiveDate::parse_from_str(&format!("{}-01", p.month), "%Y-%m-%d").ok())
        .and_then(|d| d.checked_add_months(Months::new(1)))
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_else(|| "next month".to_string())
}
