use std::collections::HashSet;
use crate::models::{Candidate, ScoringWeights, UserRecord, MAX_RECOMMENDATIONS};
use crate::core::{
    filters::screen,
    index::JobIndex,
    scoring::calculate_match_score,
    similarity::cosine_similarities,
};

/// Result of the matching process for one user
#[derive(Debug)]
pub struct MatchResult {
    /// Top matches, best first
    pub matches: Vec<Candidate>,
    /// Jobs admitted by the constraint filter before truncation
    pub admitted: usize,
    /// Jobs considered
    pub total_jobs: usize,
}

/// Main matching pipeline
///
/// # Pipeline Stages
/// 1. Semantic similarity of the user's intent against every job
/// 2. Constraint filtering (already seen, skills, location, salary)
/// 3. Composite scoring of admitted jobs
/// 4. Stable ranking and top-k truncation
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score every admissible job for a user
    ///
    /// # Arguments
    /// * `user` - The user being matched
    /// * `user_embedding` - Embedding of the user's intent text
    /// * `index` - This cycle's jobs and their embeddings
    /// * `excluded_job_ids` - Jobs the user has already swiped on
    ///
    /// # Returns
    /// Candidates in job order; every one passed the constraint filter
    pub fn generate_candidates(
        &self,
        user: &UserRecord,
        user_embedding: &[f32],
        index: &JobIndex,
        excluded_job_ids: &HashSet<String>,
    ) -> Vec<Candidate> {
        let similarities = cosine_similarities(user_embedding, index.embeddings());

        index
            .jobs()
            .iter()
            .zip(similarities)
            .filter_map(|(job, semantic)| {
                let overlap = match screen(user, job, excluded_job_ids) {
                    Ok(overlap) => overlap,
                    Err(check) => {
                        tracing::trace!("Job {} rejected for user {} by {}", job.id, user.id, check);
                        return None;
                    }
                };

                Some(Candidate {
                    job_id: job.id.clone(),
                    score: calculate_match_score(semantic, overlap.ratio, &self.weights),
                    semantic,
                    skill_ratio: overlap.ratio,
                    skill_overlap: overlap.count,
                })
            })
            .collect()
    }

    /// Order candidates by score and keep the best [`MAX_RECOMMENDATIONS`]
    ///
    /// The sort is stable, so equal scores keep their generation order.
    /// A NaN score ranks below every number.
    pub fn rank(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| rank_key(b.score).total_cmp(&rank_key(a.score)));
        candidates.truncate(MAX_RECOMMENDATIONS);
        candidates
    }

    /// Generate and rank in one step
    pub fn find_matches(
        &self,
        user: &UserRecord,
        user_embedding: &[f32],
        index: &JobIndex,
        excluded_job_ids: &HashSet<String>,
    ) -> MatchResult {
        let candidates = self.generate_candidates(user, user_embedding, index, excluded_job_ids);
        let admitted = candidates.len();

        MatchResult {
            matches: self.rank(candidates),
            admitted,
            total_jobs: index.len(),
        }
    }
}

#[inline]
fn rank_key(score: f64) -> f64 {
    if score.is_nan() { f64::NEG_INFINITY } else { score }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
