//! Red/amber/green tolerance bands.
//!
//! Each metric carries one band definition. Bands are checked green first,
//! then amber, then red; a value matching none of them is treated as red.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandOperator {
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "range")]
    Range,
}

impl BandOperator {
    /// `>=` reads `min`, `<=` reads `max`, `==` reads `min` (falling back to
    /// `max`), `range` treats a missing bound as unbounded.
    pub fn matches(self, value: f64, min: Option<f64>, max: Option<f64>) -> bool {
        match self {
            BandOperator::Gte => min.is_some_and(|m| value >= m),
            BandOperator::Lte => max.is_some_and(|m| value <= m),
            BandOperator::Eq => min.or(max).is_some_and(|m| value == m),
            BandOperator::Range => {
                min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RagStatus {
    Green,
    Amber,
    Red,
}

impl RagStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RagStatus::Green => "green",
            RagStatus::Amber => "amber",
            RagStatus::Red => "red",
        }
    }
}

/// Period-to-period movement of a metric, read through its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Flat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToleranceBand {
    pub metric_number: u32,
    #[serde(default)]
    pub green_min: Option<f64>,
    #[serde(default)]
    pub green_max: Option<f64>,
    pub green_operator: BandOperator,
    #[serde(default)]
    pub amber_min: Option<f64>,
    #[serde(default)]
    pub amber_max: Option<f64>,
    pub amber_operator: BandOperator,
    #[serde(default)]
    pub red_min: Option<f64>,
    #[serde(default)]
    pub red_max: Option<f64>,
    pub red_operator: BandOperator,
    #[serde(default)]
    pub is_lower_better: bool,
    #[serde(default)]
    pub flat_tolerance: f64,
}

impl ToleranceBand {
    pub fn evaluate(&self, value: f64) -> RagStatus {
        if self.green_operator.matches(value, self.green_min, self.green_max) {
            RagStatus::Green
        } else if self.amber_operator.matches(value, self.amber_min, self.amber_max) {
            RagStatus::Amber
        } else {
            RagStatus::Red
        }
    }

    /// Movements within `flat_tolerance` (inclusive) are flat.
    pub fn trend(&self, previous: f64, current: f64) -> TrendDirection {
        let delta = current - previous;
        if delta.abs() <= self.flat_tolerance {
            TrendDirection::Flat
        } else if (delta > 0.0) != self.is_lower_better {
            TrendDirection::Improving
        } else {
            TrendDirection::Declining
        }
    }

    /// Closed `[min, max]` interval of the green band, only for fully bounded
    /// `range` definitions.
    pub fn green_zone(&self) -> Option<(f64, f64)> {
        bounded_range(self.green_operator, self.green_min, self.green_max)
    }

    pub fn red_zone(&self) -> Option<(f64, f64)> {
        bounded_range(self.red_operator, self.red_min, self.red_max)
    }
}

fn bounded_range(op: BandOperator, min: Option<f64>, max: Option<f64>) -> Option<(f64, f64)> {
    match (op, min, max) {
        (BandOperator::Range, Some(lo), Some(hi)) => Some((lo, hi)),
        _ => None,
    }
}

pub fn find_band(tolerances: &[ToleranceBand], metric_number: u32) -> Option<&ToleranceBand> {
    tolerances.iter().find(|t| t.metric_number == metric_number)
}

/// Polarity of a metric; metrics without a band default to higher-is-better.
pub fn is_lower_better(tolerances: &[ToleranceBand], metric_number: u32) -> bool {
    find_band(tolerances, metric_number).is_some_and(|t| t.is_lower_better)
}

#[cfg(test)]
pub(crate) fn range_band(
    metric_number: u32,
    green: (f64, f64),
    red: (f64, f64),
    is_lower_better: bool,
) -> ToleranceBand {
    ToleranceBand {
        metric_number,
        green_min: Some(green.0),
        green_max: Some(green.1),
        green_operator: BandOperator::Range,
        amber_min: None,
        amber_max: None,
        amber_operator: BandOperator::Range,
        red_min: Some(red.0),
        red_max: Some(red.1),
        red_operator: BandOperator::Range,
        is_lower_better,
        flat_tolerance: 0.0,
    }
}

#[cfg(test)]
pub(crate) fn polarity_band(metric_number: u32, is_lower_better: bool) -> ToleranceBand {
    ToleranceBand {
        metric_number,
        green_min: Some(90.0),
        green_max: None,
        green_operator: BandOperator::Gte,
        amber_min: Some(75.0),
        amber_max: Some(90.0),
        amber_operator: BandOperator::Range,
        red_min: None,
        red_max: Some(75.0),
        red_operator: BandOperator::Lte,
        is_lower_better,
        flat_tolerance: 0.5,
    }
}
