use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

/// Maximum number of jobs recommended to a user per cycle
pub const MAX_RECOMMENDATIONS: usize = 5;

/// A skill as delivered by the data API: either a bare name or a record
/// carrying a `name` field (extra fields such as level are ignored).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skill {
    Plain(String),
    Named { name: String },
}

impl Skill {
    /// Canonical form used for set comparison
    pub fn normalized(&self) -> String {
        match self {
            Skill::Plain(name) | Skill::Named { name } => name.trim().to_lowercase(),
        }
    }
}

impl From<&str> for Skill {
    fn from(name: &str) -> Self {
        Skill::Plain(name.to_string())
    }
}

/// Job-seeking user record
///
/// Decoded from either `user_id` or a legacy `id` key; `user_id` wins when
/// both are present.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(try_from = "RawUserRecord")]
pub struct UserRecord {
    #[validate(length(min = 1))]
    #[serde(rename = "user_id")]
    pub id: String,
    pub intent_text: String,
    pub skills: Vec<Skill>,
    pub constraints: UserConstraints,
}

#[derive(Deserialize)]
struct RawUserRecord {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    intent_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    skills: Vec<Skill>,
    #[serde(default, deserialize_with = "null_as_default")]
    constraints: UserConstraints,
}

impl TryFrom<RawUserRecord> for UserRecord {
    type Error = &'static str;

    fn try_from(raw: RawUserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.user_id.or(raw.id).ok_or("missing field `user_id`")?,
            intent_text: raw.intent_text,
            skills: raw.skills,
            constraints: raw.constraints,
        })
    }
}

impl UserRecord {
    /// Users without intent text cannot be embedded and are skipped
    pub fn has_intent(&self) -> bool {
        !self.intent_text.trim().is_empty()
    }
}

/// Hard constraints a user places on the jobs they are shown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConstraints {
    #[serde(default, deserialize_with = "null_as_default")]
    pub remote_only: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferred_locations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferred_salary: f64,
}

/// Job posting record, keyed by `job_id` or a legacy `id`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(try_from = "RawJobRecord")]
pub struct JobRecord {
    #[validate(length(min = 1))]
    #[serde(rename = "job_id")]
    pub id: String,
    pub problem_statement: String,
    pub skills_required: Vec<Skill>,
    pub constraints: JobConstraints,
}

#[derive(Deserialize)]
struct RawJobRecord {
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    problem_statement: String,
    #[serde(default, deserialize_with = "null_as_default")]
    skills_required: Vec<Skill>,
    #[serde(default, deserialize_with = "null_as_default")]
    constraints: JobConstraints,
}

impl TryFrom<RawJobRecord> for JobRecord {
    type Error = &'static str;

    fn try_from(raw: RawJobRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.job_id.or(raw.id).ok_or("missing field `job_id`")?,
            problem_statement: raw.problem_statement,
            skills_required: raw.skills_required,
            constraints: raw.constraints,
        })
    }
}

/// Constraints attached to a job posting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConstraints {
    #[serde(default)]
    pub location: Option<String>,
    /// Kept as raw JSON: anything other than a two-number array is treated
    /// as malformed and skips the salary check. A missing key means `[0, 0]`.
    #[serde(default = "default_salary_range")]
    pub salary_range: Value,
}

impl Default for JobConstraints {
    fn default() -> Self {
        Self {
            location: None,
            salary_range: default_salary_range(),
        }
    }
}

impl JobConstraints {
    /// Upper bound of the salary interval, if the interval is well-formed
    pub fn salary_ceiling(&self) -> Option<f64> {
        match self.salary_range.as_array().map(Vec::as_slice) {
            Some([min, max]) if min.is_number() => max.as_f64(),
            _ => None,
        }
    }
}

fn default_salary_range() -> Value {
    Value::Array(vec![Value::from(0), Value::from(0)])
}

/// A job the user has already swiped on, in either direction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeRecord {
    pub user_id: String,
    pub job_id: String,
    #[serde(default)]
    pub direction: Option<String>,
}

/// A job admitted by the constraint filter, with its score breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub job_id: String,
    pub score: f64,
    pub semantic: f64,
    pub skill_ratio: f64,
    pub skill_overlap: usize,
}

/// Ranked shortlist for one user, ready to be turned into a sink payload
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub user_id: String,
    pub best_score: f64,
    pub cooldown_job_ids: Vec<String>,
}

/// Weights of the composite score
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub semantic: f64,
    pub skills: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: 0.6,
            skills: 0.4,
        }
    }
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
