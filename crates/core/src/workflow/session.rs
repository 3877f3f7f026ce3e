use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::benchmark::{Benchmark, BenchmarkQuery};
use crate::domain::feedback::FeedbackJudgment;
use crate::domain::recommendation::Recommendation;
use crate::domain::upload::ExportFile;
use crate::gateway::AnalysisGateway;
use crate::workflow::evaluation::EvaluationRefresher;
use crate::workflow::feedback::FeedbackRecorder;
use crate::workflow::simulate::{SimulationRequester, SimulationTicket, SimulationView};
use crate::workflow::store::{RecommendationFilter, RecommendationStore};
use crate::workflow::upload::{UploadCoordinator, UploadOutcome};
use crate::workflow::WorkflowError;

const ANALYZE_FALLBACK: &str = "Failed to analyze campaigns";

/// The three top-level screens of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    Upload,
    Recommendations,
    Evaluation,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Recommendations => "recommendations",
            Self::Evaluation => "evaluation",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user's pass through upload, analysis, recommendations and evaluation.
/// Owns every workflow component and enforces the step ordering between them.
pub struct WorkflowSession {
    gateway: Arc<dyn AnalysisGateway>,
    step: WorkflowStep,
    upload: UploadCoordinator,
    store: RecommendationStore,
    feedback: FeedbackRecorder,
    simulation: SimulationRequester,
    evaluation: EvaluationRefresher,
    error: Option<String>,
}

impl WorkflowSession {
    pub fn new(gateway: Arc<dyn AnalysisGateway>) -> Self {
        let upload = UploadCoordinator::new(Arc::clone(&gateway));
        let feedback = FeedbackRecorder::new(Arc::clone(&gateway));
        let evaluation = EvaluationRefresher::new(Arc::clone(&gateway), feedback.subscribe());
        let simulation = SimulationRequester::new(Arc::clone(&gateway));
        Self {
            gateway,
            step: WorkflowStep::Upload,
            upload,
            store: RecommendationStore::new(),
            feedback,
            simulation,
            evaluation,
            error: None,
        }
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    /// Most recent analysis failure message, if the last analysis failed.
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn upload(&self) -> &UploadCoordinator {
        &self.upload
    }

    pub fn store(&self) -> &RecommendationStore {
        &self.store
    }

    pub fn feedback(&self) -> &FeedbackRecorder {
        &self.feedback
    }

    pub fn evaluation(&self) -> &EvaluationRefresher {
        &self.evaluation
    }

    pub fn simulation_view(&self) -> &SimulationView {
        self.simulation.view()
    }

    /// Move between steps. The recommendation and evaluation screens are
    /// unreachable until an analysis has produced at least one result.
    pub fn navigate(&mut self, step: WorkflowStep) -> Result<(), WorkflowError> {
        match step {
            WorkflowStep::Upload => {
                self.step = step;
                Ok(())
            }
            WorkflowStep::Recommendations | WorkflowStep::Evaluation => {
                if self.store.is_empty() {
                    return Err(WorkflowError::Precondition(format!(
                        "no recommendations loaded yet; run an analysis before opening {step}"
                    )));
                }
                self.step = step;
                Ok(())
            }
        }
    }

    pub async fn select_file(&self, file: ExportFile) -> Result<(), WorkflowError> {
        self.upload.select(file).await
    }

    pub async fn submit_upload(&mut self) -> Result<UploadOutcome, WorkflowError> {
        let outcome = self.upload.submit().await?;
        if matches!(outcome, UploadOutcome::Completed(_)) {
            self.error = None;
        }
        Ok(outcome)
    }

    pub async fn load_sample(&mut self) -> Result<UploadOutcome, WorkflowError> {
        let outcome = self.upload.load_sample().await?;
        if matches!(outcome, UploadOutcome::Completed(_)) {
            self.error = None;
        }
        Ok(outcome)
    }

    /// Run the analysis pipeline and advance to the recommendations step.
    ///
    /// The three calls are strictly ordered: benchmarks first, then the
    /// analyze trigger that recomputes recommendations server-side, then the
    /// recommendation fetch. The result lands in the store all-or-nothing; a
    /// failure anywhere leaves the session on the upload step with whatever
    /// the store held before.
    pub async fn analyze(&mut self) -> Result<usize, WorkflowError> {
        if !self.upload.has_report().await {
            return Err(WorkflowError::Precondition(
                "upload a campaign export before analyzing".to_string(),
            ));
        }
        self.error = None;
        match self.run_analysis().await {
            Ok((recommendations, benchmarks)) => {
                let found = recommendations.len();
                self.store.replace(recommendations, benchmarks);
                self.step = WorkflowStep::Recommendations;
                tracing::info!(found, "analysis complete");
                Ok(found)
            }
            Err(err) => {
                self.error = Some(match &err {
                    WorkflowError::Gateway(gateway_err) => {
                        gateway_err.display_message(ANALYZE_FALLBACK)
                    }
                    other => other.to_string(),
                });
                tracing::warn!(error = %err, "analysis failed; staying on upload step");
                Err(err)
            }
        }
    }

    async fn run_analysis(
        &self,
    ) -> Result<(Vec<Recommendation>, Vec<Benchmark>), WorkflowError> {
        let benchmarks = self.gateway.benchmarks(&BenchmarkQuery::default()).await?;
        self.gateway.analyze().await?;
        let recommendations = self.gateway.recommendations().await?;
        Ok((recommendations, benchmarks))
    }

    /// Re-pull stored recommendations outside the analyze pipeline, for
    /// example to resume a previous server-side session. Benchmarks degrade
    /// gracefully here instead of failing the reload.
    pub async fn reload_recommendations(&mut self) -> Result<(), WorkflowError> {
        self.store.load(self.gateway.as_ref()).await
    }

    pub fn filtered(&self, filter: &RecommendationFilter) -> Vec<&Recommendation> {
        self.store.filtered(filter)
    }

    pub fn citations(&self, recommendation: &Recommendation) -> Vec<&Benchmark> {
        self.store.citations(recommendation)
    }

    /// Record a judgment and fold in the follow-up metrics refresh. The
    /// refresh is best-effort: feedback that reached the service stays
    /// recorded even if the metrics re-fetch fails.
    pub async fn submit_feedback(
        &mut self,
        recommendation_id: Uuid,
        is_useful: bool,
    ) -> Result<FeedbackJudgment, WorkflowError> {
        let recommendation = self.store.get(recommendation_id).ok_or_else(|| {
            WorkflowError::Precondition(format!(
                "recommendation {recommendation_id} is not loaded"
            ))
        })?;
        let judgment = self.feedback.submit(recommendation, is_useful).await?;
        if let Err(err) = self.evaluation.refresh_if_signaled().await {
            tracing::warn!(error = %err, "metrics refresh after feedback failed");
        }
        Ok(judgment)
    }

    pub async fn refresh_evaluation(&mut self) -> Result<(), WorkflowError> {
        self.evaluation.refresh().await
    }

    pub fn open_simulation(
        &mut self,
        recommendation_id: Uuid,
    ) -> Result<SimulationTicket, WorkflowError> {
        let recommendation = self.store.get(recommendation_id).ok_or_else(|| {
            WorkflowError::Precondition(format!(
                "recommendation {recommendation_id} is not loaded"
            ))
        })?;
        self.simulation.open(recommendation)
    }

    pub async fn resolve_simulation(&mut self, ticket: &SimulationTicket) -> &SimulationView {
        self.simulation.resolve(ticket).await
    }

    /// Open and resolve in one step.
    pub async fn simulate(
        &mut self,
        recommendation_id: Uuid,
    ) -> Result<&SimulationView, WorkflowError> {
        let ticket = self.open_simulation(recommendation_id)?;
        Ok(self.resolve_simulation(&ticket).await)
    }

    pub fn close_simulation(&mut self) {
        self.simulation.close();
    }
}
