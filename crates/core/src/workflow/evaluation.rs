use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::evaluation::EvaluationMetrics;
use crate::domain::recommendation::RecommendationKind;
use crate::gateway::AnalysisGateway;
use crate::workflow::WorkflowError;

const METRICS_FALLBACK: &str = "Failed to fetch evaluation metrics";

/// Below this many judgments a per-type precision figure is flagged as
/// preliminary.
pub const LOW_SAMPLE_THRESHOLD: u64 = 5;

/// Keeps the latest evaluation metrics, re-fetching wholesale when asked or
/// when the feedback recorder signals a change. A failed refresh keeps the
/// previous snapshot.
pub struct EvaluationRefresher {
    gateway: Arc<dyn AnalysisGateway>,
    changed: watch::Receiver<u64>,
    metrics: Option<EvaluationMetrics>,
    error: Option<String>,
}

impl EvaluationRefresher {
    pub fn new(gateway: Arc<dyn AnalysisGateway>, changed: watch::Receiver<u64>) -> Self {
        Self {
            gateway,
            changed,
            metrics: None,
            error: None,
        }
    }

    pub fn metrics(&self) -> Option<&EvaluationMetrics> {
        self.metrics.as_ref()
    }

    pub fn summary(&self) -> Option<EvaluationSummary> {
        self.metrics.as_ref().map(EvaluationSummary::derive)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Unconditional wholesale re-fetch; there is no incremental path.
    pub async fn refresh(&mut self) -> Result<(), WorkflowError> {
        match self.gateway.evaluation_metrics().await {
            Ok(metrics) => {
                tracing::debug!(total_feedback = metrics.total_feedback, "evaluation metrics refreshed");
                self.metrics = Some(metrics);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "evaluation metrics fetch failed");
                self.error = Some(err.display_message(METRICS_FALLBACK));
                Err(err.into())
            }
        }
    }

    /// Re-fetch only if feedback landed since the last check. Returns whether
    /// a refresh ran.
    pub async fn refresh_if_signaled(&mut self) -> Result<bool, WorkflowError> {
        if !self.changed.has_changed().unwrap_or(false) {
            return Ok(false);
        }
        self.changed.borrow_and_update();
        self.refresh().await?;
        Ok(true)
    }
}

/// Display digest derived from one metrics snapshot. With zero feedback there
/// is deliberately no `Ready` payload: nothing downstream can read a
/// percentage out of an empty sample.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationSummary {
    NoData,
    Ready(EvaluationDigest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDigest {
    pub overall_pct: u8,
    pub useful_count: u64,
    pub total_feedback: u64,
    /// One row per rule type, in the order the service listed them.
    pub rows: Vec<TypeRow>,
    /// Highest-precision row; ties keep the earliest listed.
    pub top_rule: Option<TypeRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeRow {
    pub kind: RecommendationKind,
    pub pct: u8,
    pub useful: u64,
    pub total: u64,
    pub low_sample: bool,
}

impl EvaluationSummary {
    pub fn derive(metrics: &EvaluationMetrics) -> Self {
        if metrics.total_feedback == 0 {
            return Self::NoData;
        }
        let rows: Vec<TypeRow> = metrics
            .by_type
            .iter()
            .map(|(kind, type_metrics)| TypeRow {
                kind: RecommendationKind::from(kind.to_string()),
                pct: whole_pct(type_metrics.precision),
                useful: type_metrics.useful,
                total: type_metrics.total,
                low_sample: type_metrics.total < LOW_SAMPLE_THRESHOLD,
            })
            .collect();

        let mut top_index: Option<usize> = None;
        let mut top_precision = f64::NEG_INFINITY;
        for (index, (_, type_metrics)) in metrics.by_type.iter().enumerate() {
            if type_metrics.precision > top_precision {
                top_precision = type_metrics.precision;
                top_index = Some(index);
            }
        }

        Self::Ready(EvaluationDigest {
            overall_pct: whole_pct(metrics.overall_precision),
            useful_count: metrics.useful_count,
            total_feedback: metrics.total_feedback,
            top_rule: top_index.map(|index| rows[index].clone()),
            rows,
        })
    }
}

fn whole_pct(fraction: f64) -> u8 {
    (fraction * 100.0).round() as u8
}
