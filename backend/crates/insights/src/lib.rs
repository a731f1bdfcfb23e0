pub mod config;
pub mod engine;
pub mod generators;
pub mod insight;
pub mod models;
pub mod series;
pub mod stats;
pub mod tolerance;

pub use config::{InsightThresholds, InsightsConfig};
pub use engine::{generate_insights, top_by_severity, InsightOptions};
pub use insight::{Insight, InsightKind, Severity};
pub use models::{MetricReading, ReportingPeriod};
pub use tolerance::{BandOperator, RagStatus, ToleranceBand, TrendDirection};
