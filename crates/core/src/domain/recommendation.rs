use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One explainable optimization suggestion produced by the analysis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    /// Rule confidence in `[0, 1]`.
    pub confidence: f64,
    pub why_fired: String,
    #[serde(default)]
    pub trigger_metrics: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub projected_impact: String,
    #[serde(default)]
    pub details: RecommendationDetails,
    /// Ids of the published benchmarks cited as evidence.
    #[serde(default)]
    pub source_ids: Vec<String>,
}

impl Recommendation {
    /// Whole-percent confidence, the same figure the badge and the
    /// minimum-confidence filter both read.
    pub fn confidence_pct(&self) -> u8 {
        (self.confidence * 100.0).round() as u8
    }

    pub fn confidence_tier(&self) -> ConfidenceTier {
        if self.confidence >= 0.8 {
            ConfidenceTier::High
        } else if self.confidence >= 0.6 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.confidence),
            "confidence must be between 0 and 1 (got {})",
            self.confidence
        );
        Ok(())
    }
}

/// Rule family a recommendation came from. Unknown kinds survive a round trip
/// unchanged so newer service rules do not break older clients at load time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecommendationKind {
    Fatigue,
    Reallocation,
    Other(String),
}

impl RecommendationKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Fatigue => "fatigue",
            Self::Reallocation => "reallocation",
            Self::Other(kind) => kind,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Fatigue => "Creative Fatigue",
            Self::Reallocation => "Budget Reallocation",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for RecommendationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "fatigue" => Self::Fatigue,
            "reallocation" => Self::Reallocation,
            _ => Self::Other(value),
        }
    }
}

impl From<RecommendationKind> for String {
    fn from(kind: RecommendationKind) -> Self {
        match kind {
            RecommendationKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific payload. Known target fields are typed; anything else the
/// service attaches is kept verbatim for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_campaign: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RecommendationDetails {
    /// Platform shown on the card; a recommendation without one reads "all".
    pub fn platform_label(&self) -> &str {
        self.platform.as_deref().unwrap_or("all")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

/// Acknowledgement returned by the analyze endpoint. The body is advisory and
/// callers re-fetch the recommendation list rather than trusting it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub recommendations_generated: Option<u64>,
}
