use serde::{Deserialize, Serialize};
use crate::models::domain::Recommendation;

/// Body posted to the recommendation store for one user
///
/// POST /ai/recommendations/update
///
/// ```json
/// {
///   "user_id": "string",
///   "positive_signals": { "predicted_match_score": 0.68, "affinity_clusters": [] },
///   "supression_rules": { "cooldown_job_ids": ["string"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationPayload {
    pub user_id: String,
    pub positive_signals: PositiveSignals,
    // The store's contract spells it this way.
    #[serde(rename = "supression_rules")]
    pub suppression_rules: SuppressionRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositiveSignals {
    pub predicted_match_score: f64,
    /// Reserved; nothing populates clusters yet
    pub affinity_clusters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuppressionRules {
    pub cooldown_job_ids: Vec<String>,
}

impl From<Recommendation> for RecommendationPayload {
    fn from(rec: Recommendation) -> Self {
        Self {
            user_id: rec.user_id,
            positive_signals: PositiveSignals {
                predicted_match_score: rec.best_score,
                affinity_clusters: Vec::new(),
            },
            suppression_rules: SuppressionRules {
                cooldown_job_ids: rec.cooldown_job_ids,
            },
        }
    }
}
