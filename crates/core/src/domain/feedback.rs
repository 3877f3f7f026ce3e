use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::recommendation::RecommendationKind;

/// A single useful / not-useful verdict on one recommendation. This is also
/// the exact wire shape posted to the feedback endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackJudgment {
    pub recommendation_id: Uuid,
    pub recommendation_type: RecommendationKind,
    pub is_useful: bool,
}

/// Acknowledgement body for a recorded judgment. Advisory only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
