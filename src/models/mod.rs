// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Candidate, JobConstraints, JobRecord, Recommendation, ScoringWeights, Skill, SwipeRecord,
    UserConstraints, UserRecord, MAX_RECOMMENDATIONS,
};
pub use requests::{PositiveSignals, RecommendationPayload, SuppressionRules};
pub use responses::{DataPage, ErrorResponse, HealthResponse};
