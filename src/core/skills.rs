use std::collections::HashSet;
use crate::models::Skill;

/// Overlap between a user's skills and a job's required skills
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillOverlap {
    /// Number of skills present on both sides
    pub count: usize,
    /// Jaccard ratio |A ∩ B| / |A ∪ B|, in 0.0..=1.0
    pub ratio: f64,
}

impl SkillOverlap {
    pub const NONE: SkillOverlap = SkillOverlap { count: 0, ratio: 0.0 };
}

/// Normalize a skill collection into a lower-cased, trimmed set
pub fn normalize_skills(skills: &[Skill]) -> HashSet<String> {
    skills.iter().map(Skill::normalized).collect()
}

/// Compare two skill collections
///
/// Either side empty yields [`SkillOverlap::NONE`]; the union is never
/// divided by when empty.
pub fn skill_overlap(user_skills: &[Skill], job_skills: &[Skill]) -> SkillOverlap {
    if user_skills.is_empty() || job_skills.is_empty() {
        return SkillOverlap::NONE;
    }

    let user_set = normalize_skills(user_skills);
    let job_set = normalize_skills(job_skills);

    let intersection = user_set.intersection(&job_set).count();
    let union = user_set.union(&job_set).count();

    if union == 0 {
        return SkillOverlap::NONE;
    }

    SkillOverlap {
        count: intersection,
        ratio: intersection as f64 / union as f64,
    }
}
