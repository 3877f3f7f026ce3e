use std::fmt;

use serde::{Deserialize, Serialize};

/// Bootstrap simulation outcome for one campaign action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub current_metrics: CurrentMetrics,
    pub projected_metrics: ProjectedMetrics,
    #[serde(default)]
    pub confidence_interval: String,
    #[serde(default)]
    pub impact_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMetrics {
    pub avg_daily_spend: f64,
    pub avg_roas: f64,
    /// CPA cannot be computed for zero-conversion campaigns; the service then
    /// sends the literal text "N/A" instead of a number.
    pub avg_cpa: MetricValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedMetrics {
    pub roas: ProjectedRange,
    pub daily_revenue_lift: ProjectedRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpa: Option<CpaProjection>,
}

/// Median plus the 5th/95th bootstrap percentiles for one projected metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRange {
    pub median: f64,
    pub p5: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpaProjection {
    pub median: f64,
    pub reduction_pct: f64,
}

/// A numeric metric, or substitute text when the metric is undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// The action whose impact gets simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulatedAction {
    RefreshCreative,
    ReallocateBudget,
}

impl SimulatedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RefreshCreative => "refresh_creative",
            Self::ReallocateBudget => "reallocate_budget",
        }
    }
}

impl fmt::Display for SimulatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent offsets for drawing a p5..p95 interval bar with a median dot on a
/// horizontal track. All three values are percentages of the track width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBarLayout {
    pub left_pct: f64,
    pub width_pct: f64,
    pub dot_pct: f64,
}

impl RangeBarLayout {
    /// Layout for a metric floored at zero, such as ROAS. The track spans
    /// max(0, low × 0.8) .. high × 1.2 around the projected values.
    pub fn non_negative(range: &ProjectedRange) -> Self {
        let low = range.p5.min(range.median).min(range.p95);
        Self::from_floor(range, (low * 0.8).max(0.0))
    }

    /// Layout for a signed metric, such as daily revenue lift. The floor is
    /// min(p5, median) × 0.8 and may be negative.
    pub fn signed(range: &ProjectedRange) -> Self {
        Self::from_floor(range, range.p5.min(range.median) * 0.8)
    }

    fn from_floor(range: &ProjectedRange, min: f64) -> Self {
        let high = range.p5.max(range.median).max(range.p95);
        let max = high * 1.2;
        let mut span = max - min;
        if span == 0.0 {
            span = 1.0;
        }
        Self {
            left_pct: (range.p5.min(range.p95) - min) / span * 100.0,
            width_pct: (range.p95 - range.p5).abs() / span * 100.0,
            dot_pct: (range.median - min) / span * 100.0,
        }
    }
}
