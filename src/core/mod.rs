// Core algorithm exports
pub mod exclusions;
pub mod filters;
pub mod index;
pub mod matcher;
pub mod recommendation;
pub mod scoring;
pub mod similarity;
pub mod skills;

pub use exclusions::ExclusionMap;
pub use filters::{admit, first_rejection, screen, FilterContext, CONSTRAINT_CHAIN};
pub use index::{dedupe_jobs, is_finite_vector, IndexError, JobIndex};
pub use matcher::{MatchResult, Matcher};
pub use recommendation::build_recommendation;
pub use scoring::calculate_match_score;
pub use similarity::{cosine_similarities, cosine_similarity};
pub use skills::{skill_overlap, SkillOverlap};
