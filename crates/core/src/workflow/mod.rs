pub mod evaluation;
pub mod feedback;
pub mod session;
pub mod simulate;
pub mod store;
pub mod upload;

use thiserror::Error;
use uuid::Uuid;

use crate::gateway::GatewayError;

/// Failure of a workflow operation. Remote failures wrap the gateway error;
/// the rest are client-side rule violations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The chosen file does not look like a CSV export.
    #[error("\"{name}\" is not a CSV file")]
    InvalidFileType { name: String },

    /// The operation ran before its prerequisite was met.
    #[error("{0}")]
    Precondition(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// This session already recorded a judgment for the recommendation.
    #[error("feedback already recorded for recommendation {recommendation_id}")]
    DuplicateFeedback { recommendation_id: Uuid },

    /// No simulated action is defined for this recommendation kind.
    #[error("cannot simulate recommendation kind \"{kind}\"")]
    UnsupportedKind { kind: String },
}
