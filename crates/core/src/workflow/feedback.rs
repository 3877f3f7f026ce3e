use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::feedback::FeedbackJudgment;
use crate::domain::recommendation::Recommendation;
use crate::gateway::AnalysisGateway;
use crate::workflow::WorkflowError;

/// Records useful / not-useful judgments, at most one per recommendation per
/// session. Each accepted judgment bumps a watch channel so interested views
/// know the aggregate metrics went stale.
pub struct FeedbackRecorder {
    gateway: Arc<dyn AnalysisGateway>,
    judgments: HashMap<Uuid, FeedbackJudgment>,
    changed: watch::Sender<u64>,
}

impl FeedbackRecorder {
    pub fn new(gateway: Arc<dyn AnalysisGateway>) -> Self {
        let (changed, _) = watch::channel(0);
        Self {
            gateway,
            judgments: HashMap::new(),
            changed,
        }
    }

    /// Receiver for the change signal. Fresh receivers treat the current
    /// generation as already seen.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    pub fn has_feedback(&self, recommendation_id: Uuid) -> bool {
        self.judgments.contains_key(&recommendation_id)
    }

    pub fn judgment(&self, recommendation_id: Uuid) -> Option<&FeedbackJudgment> {
        self.judgments.get(&recommendation_id)
    }

    pub fn count(&self) -> usize {
        self.judgments.len()
    }

    /// Record a judgment. The duplicate check runs before any network call,
    /// so a second vote on the same recommendation costs nothing remotely. On
    /// gateway failure nothing is recorded and the vote stays retryable.
    pub async fn submit(
        &mut self,
        recommendation: &Recommendation,
        is_useful: bool,
    ) -> Result<FeedbackJudgment, WorkflowError> {
        if self.judgments.contains_key(&recommendation.id) {
            return Err(WorkflowError::DuplicateFeedback {
                recommendation_id: recommendation.id,
            });
        }
        let judgment = FeedbackJudgment {
            recommendation_id: recommendation.id,
            recommendation_type: recommendation.kind.clone(),
            is_useful,
        };
        self.gateway.submit_feedback(&judgment).await?;
        self.judgments.insert(recommendation.id, judgment.clone());
        self.changed.send_modify(|generation| *generation += 1);
        tracing::info!(
            recommendation_id = %recommendation.id,
            kind = %judgment.recommendation_type,
            is_useful,
            "feedback recorded"
        );
        Ok(judgment)
    }
}
