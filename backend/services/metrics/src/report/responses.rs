use chrono::{DateTime, Utc};
use kpiboard_common::types::ServiceInfo;
use kpiboard_insights::Insight;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct InsightReport {
    pub service: ServiceInfo,
    pub generated_at: DateTime<Utc>,
    pub data: Vec<Insight>,
    pub count: usize,
}

impl InsightReport {
    pub fn new(service: ServiceInfo, data: Vec<Insight>) -> Self {
        let count = data.len();
        Self {
            service,
            generated_at: Utc::now(),
            data,
            count,
        }
    }
}
