use crate::models::ScoringWeights;

/// Composite match score for an admitted job
///
/// Scoring formula:
/// score = (
///     semantic_similarity * 0.6 +   # intent text vs problem statement
///     skill_ratio * 0.4             # Jaccard overlap of skills
/// )
///
/// With both components in 0.0..=1.0 and weights summing to 1.0 the
/// result stays in 0.0..=1.0. Negative cosine similarity is passed through.
#[inline]
pub fn calculate_match_score(semantic: f64, skill_ratio: f64, weights: &ScoringWeights) -> f64 {
    semantic * weights.semantic + skill_ratio * weights.skills
}
