use crate::models::{Candidate, Recommendation};

/// Turn a ranked shortlist into a recommendation
///
/// Returns `None` when there is nothing to recommend, in which case no
/// submission is made for the user.
pub fn build_recommendation(user_id: &str, top_matches: &[Candidate]) -> Option<Recommendation> {
    let best = top_matches.first()?;

    Some(Recommendation {
        user_id: user_id.to_string(),
        best_score: best.score,
        cooldown_job_ids: top_matches.iter().map(|m| m.job_id.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, score: f64) -> Candidate {
        Candidate {
            job_id: id.to_string(),
            score,
            semantic: score,
            skill_ratio: score,
            skill_overlap: 1,
        }
    }

    #[test]
    fn test_empty_shortlist_builds_nothing() {
        assert_eq!(build_recommendation("u1", &[]), None);
    }

    #[test]
    fn test_best_score_and_cooldown_order() {
        let top = vec![candidate("j3", 0.9), candidate("j1", 0.7), candidate("j2", 0.7)];

        let rec = build_recommendation("u1", &top).unwrap();

        assert_eq!(rec.user_id, "u1");
        assert_eq!(rec.best_score, 0.9);
        assert_eq!(rec.cooldown_job_ids, vec!["j3", "j1", "j2"]);
    }
}
