pub mod error;
pub mod http;

use async_trait::async_trait;

use crate::domain::benchmark::{Benchmark, BenchmarkQuery};
use crate::domain::evaluation::EvaluationMetrics;
use crate::domain::feedback::{FeedbackAck, FeedbackJudgment};
use crate::domain::recommendation::{AnalyzeAck, Recommendation};
use crate::domain::simulation::{SimulatedAction, SimulationReport};
use crate::domain::upload::{CampaignRow, ExportFile, UploadReport};
pub use error::GatewayError;

/// Typed client surface of the remote analysis service. Every workflow
/// component talks to the service through this trait, which keeps the
/// components testable against scripted doubles.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// Submit a raw CSV export for cleaning and ingestion.
    async fn upload_csv(&self, file: &ExportFile) -> Result<UploadReport, GatewayError>;

    /// Every normalized campaign row currently held by the service.
    async fn campaigns(&self) -> Result<Vec<CampaignRow>, GatewayError>;

    /// Run the rule engine over the ingested data. Recommendations are
    /// recomputed server-side; fetch them afterwards with `recommendations`.
    async fn analyze(&self) -> Result<AnalyzeAck, GatewayError>;

    /// The stored recommendation list from the most recent analysis.
    async fn recommendations(&self) -> Result<Vec<Recommendation>, GatewayError>;

    /// Published benchmarks, optionally narrowed by platform and metric type.
    async fn benchmarks(&self, query: &BenchmarkQuery) -> Result<Vec<Benchmark>, GatewayError>;

    /// A single benchmark, or `None` when the id is unknown.
    async fn benchmark_by_id(&self, id: &str) -> Result<Option<Benchmark>, GatewayError>;

    /// Record one useful / not-useful judgment.
    async fn submit_feedback(&self, judgment: &FeedbackJudgment)
        -> Result<FeedbackAck, GatewayError>;

    /// Aggregate precision metrics over all recorded feedback.
    async fn evaluation_metrics(&self) -> Result<EvaluationMetrics, GatewayError>;

    /// Bootstrap-simulate the impact of applying `action` to one campaign.
    async fn simulate(
        &self,
        campaign_name: &str,
        action: SimulatedAction,
    ) -> Result<SimulationReport, GatewayError>;
}
