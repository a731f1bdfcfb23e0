use std::cell::Cell;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::series::SeriesPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Trend,
    Anomaly,
    Milestone,
    Comparison,
    Forecast,
    Correlation,
}

impl InsightKind {
    /// Declaration order, which is also the order results are concatenated in.
    pub const ALL: [InsightKind; 6] = [
        InsightKind::Trend,
        InsightKind::Anomaly,
        InsightKind::Milestone,
        InsightKind::Comparison,
        InsightKind::Forecast,
        InsightKind::Correlation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Trend => "trend",
            InsightKind::Anomaly => "anomaly",
            InsightKind::Milestone => "milestone",
            InsightKind::Comparison => "comparison",
            InsightKind::Forecast => "forecast",
            InsightKind::Correlation => "correlation",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub month: String,
    pub value: f64,
}

impl From<&SeriesPoint> for DataPoint {
    fn from(p: &SeriesPoint) -> Self {
        Self {
            month: p.month.clone(),
            value: p.value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_points: Vec<DataPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projected_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Evidence {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a SeriesPoint>) -> Self {
        Self {
            data_points: points.into_iter().map(DataPoint::from).collect(),
            ..Self::default()
        }
    }

    pub fn with_change_pct(mut self, pct: f64) -> Self {
        self.change_pct = Some(pct);
        self
    }

    pub fn with_z_score(mut self, z: f64) -> Self {
        self.z_score = Some(z);
        self
    }

    pub fn with_correlation(mut self, r: f64) -> Self {
        self.correlation = Some(r);
        self
    }

    pub fn with_projection(mut self, value: f64) -> Self {
        self.projected_value = Some(value);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// One finding produced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metric_numbers: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_range: Option<PeriodRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub ai_enhanced: bool,
}

impl Insight {
    pub fn new(
        id: String,
        kind: InsightKind,
        title: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            summary: summary.into(),
            severity: None,
            metric_numbers: Vec::new(),
            period_range: None,
            evidence: None,
            recommendations: Vec::new(),
            ai_enhanced: false,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_metrics(mut self, metrics: impl IntoIterator<Item = u32>) -> Self {
        self.metric_numbers = metrics.into_iter().collect();
        self
    }

    pub fn with_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.period_range = Some(PeriodRange {
            start: start.into(),
            end: end.into(),
        });
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = Some(evidence);
        self
    }

    pub fn with_recommendations<I, S>(mut self, recs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recommendations = recs.into_iter().map(Into::into).collect();
        self
    }

    /// Apply an external enrichment. Only the narrative fields change; the
    /// id, kind, severity and evidence stay as computed.
    pub fn enrich(&mut self, summary: Option<String>, recommendations: Option<Vec<String>>) {
        if let Some(summary) = summary {
            self.summary = summary;
        }
        if let Some(recs) = recommendations {
            self.recommendations = recs;
        }
        self.ai_enhanced = true;
    }
}

/// Hands out insight ids for one engine run.
///
/// Ids look like `anomaly-3-zscore-1a2b3c4d-7`: kind, metric (or `all`), a
/// generator suffix, a random run token and a monotonic sequence number.
#[derive(Debug)]
pub struct InsightIds {
    run: String,
    next: Cell<u64>,
}

impl InsightIds {
    pub fn new() -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self {
            run: token[..8].to_string(),
            next: Cell::new(0),
        }
    }

    pub fn next(&self, kind: InsightKind, metric: Option<u32>, suffix: &str) -> String {
        let seq = self.next.get();
        self.next.set(seq + 1);
        let metric = metric.map_or_else(|| "all".to_string(), |m| m.to_string());
        format!("{}-{}-{}-{}-{}", kind.as_str(), metric, suffix, self.run, seq)
    }
}

impl Default for InsightIds {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_is_case_insensitive() {
        assert_eq!(InsightKind::parse("Trend"), Some(InsightKind::Trend));
        assert_eq!(InsightKind::parse(" correlation "), Some(InsightKind::Correlation));
        assert_eq!(InsightKind::parse("budget"), None);
    }

    #[test]
    fn severity_orders_by_urgency() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn ids_are_prefixed_and_unique() {
        let ids = InsightIds::new();
        let a = ids.next(InsightKind::Anomaly, Some(3), "zscore");
        let b = ids.next(InsightKind::Anomaly, Some(3), "zscore");
        assert!(a.starts_with("anomaly-3-zscore-"));
        assert_ne!(a, b);

        let all = ids.next(InsightKind::Trend, None, "leaders");
        assert!(all.starts_with("trend-all-leaders-"));
    }

    #[test]
    fn separate_runs_do_not_collide() {
        let a = InsightIds::new().next(InsightKind::Forecast, Some(1), "ma");
        let b = InsightIds::new().next(InsightKind::Forecast, Some(1), "ma");
        assert_ne!(a, b);
    }

    #[test]
    fn enrich_only_touches_narrative() {
        let mut insight = Insight::new("trend-1-mom-x-0".into(), InsightKind::Trend, "t", "s")
            .with_severity(Severity::Warning)
            .with_recommendations(["keep"]);
        insight.enrich(Some("richer summary".into()), None);

        assert_eq!(insight.summary, "richer summary");
        assert_eq!(insight.recommendations, vec!["keep".to_string()]);
        assert_eq!(insight.severity, Some(Severity::Warning));
        assert_eq!(insight.id, "trend-1-mom-x-0");
        assert!(insight.ai_enhanced);
    }

    #[test]
    fn serializes_type_tag_and_skips_empty_fields() {
        let insight = Insight::new("forecast-2-ma-x-0".into(), InsightKind::Forecast, "t", "s");
        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["type"], "forecast");
        assert_eq!(json["aiEnhanced"], false);
        assert!(json.get("evidence").is_none());
        assert!(json.get("metricNumbers").is_none());
    }
}
