//! Job matching engine
//!
//! Periodically pulls users, jobs and swipes from the platform's data API,
//! ranks jobs for every user by semantic similarity and skill overlap, and
//! posts the top recommendations back. The ranking pipeline lives in
//! [`core`], the cycle driver in [`cycle`].

pub mod config;
pub mod core;
pub mod cycle;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_match_score, cosine_similarity, skill_overlap, JobIndex, Matcher};
pub use cycle::{CycleError, CycleRunner, CycleSummary, UserOutcome};
pub use models::{JobRecord, RecommendationPayload, ScoringWeights, SwipeRecord, UserRecord};
