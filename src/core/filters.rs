use std::collections::HashSet;
use crate::core::skills::{skill_overlap, SkillOverlap};
use crate::models::{JobRecord, UserRecord};

/// Everything a constraint check may look at for one (user, job) pair
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub user: &'a UserRecord,
    pub job: &'a JobRecord,
    pub excluded_job_ids: &'a HashSet<String>,
    pub overlap: SkillOverlap,
}

/// A single veto: returns `true` when the job may still be shown
pub type ConstraintCheck = fn(&FilterContext<'_>) -> bool;

/// Constraint checks in evaluation order, cheapest first.
///
/// Each check is an independent veto, so the order only affects how early
/// a rejection short-circuits. A check that finds malformed data passes.
pub const CONSTRAINT_CHAIN: &[(&str, ConstraintCheck)] = &[
    ("already_seen", not_already_seen),
    ("skills", has_skill_overlap),
    ("location", matches_location),
    ("salary", meets_salary_floor),
];

/// Decide whether a job may be recommended to a user
#[inline]
pub fn admit(user: &UserRecord, job: &JobRecord, excluded_job_ids: &HashSet<String>) -> bool {
    screen(user, job, excluded_job_ids).is_ok()
}

/// Run the constraint chain for one pair
///
/// Returns the skill overlap of an admitted job, or the name of the check
/// that vetoed it. Jobs the user already swiped on are rejected before any
/// skill normalization happens.
pub fn screen(
    user: &UserRecord,
    job: &JobRecord,
    excluded_job_ids: &HashSet<String>,
) -> Result<SkillOverlap, &'static str> {
    if excluded_job_ids.contains(&job.id) {
        return Err("already_seen");
    }

    let ctx = FilterContext {
        user,
        job,
        excluded_job_ids,
        overlap: skill_overlap(&user.skills, &job.skills_required),
    };
    match first_rejection(&ctx) {
        Some(check) => Err(check),
        None => Ok(ctx.overlap),
    }
}

/// Name of the first check that vetoes the pair, if any
#[inline]
pub fn first_rejection(ctx: &FilterContext<'_>) -> Option<&'static str> {
    CONSTRAINT_CHAIN
        .iter()
        .find(|(_, check)| !check(ctx))
        .map(|(name, _)| *name)
}

/// Jobs the user already swiped on are never shown again
#[inline]
pub fn not_already_seen(ctx: &FilterContext<'_>) -> bool {
    !ctx.excluded_job_ids.contains(&ctx.job.id)
}

/// A job whose required skills are disjoint from the user's is never shown
#[inline]
pub fn has_skill_overlap(ctx: &FilterContext<'_>) -> bool {
    ctx.overlap.count > 0
}

/// Literal, case-insensitive location match
///
/// Remote-only users skip the check; jobs without a location always pass.
#[inline]
pub fn matches_location(ctx: &FilterContext<'_>) -> bool {
    let constraints = &ctx.user.constraints;
    if constraints.remote_only {
        return true;
    }

    let job_location = match ctx.job.constraints.location.as_deref() {
        Some(location) if !location.is_empty() => location.to_lowercase(),
        _ => return true,
    };

    constraints
        .preferred_locations
        .iter()
        .any(|preferred| preferred.to_lowercase() == job_location)
}

/// The user's salary floor must not exceed the job's stated maximum
#[inline]
pub fn meets_salary_floor(ctx: &FilterContext<'_>) -> bool {
    match ctx.job.constraints.salary_ceiling() {
        Some(ceiling) => ctx.user.constraints.preferred_salary <= ceiling,
        None => true,
    }
}
