use crate::core::{
    build_recommendation, dedupe_jobs, is_finite_vector, ExclusionMap, IndexError, JobIndex, Matcher,
};
use crate::models::{JobRecord, RecommendationPayload, SwipeRecord, UserRecord};
use crate::services::{
    ApiError, Collection, Embedder, EmbeddingError, RecommendationSink, RecordSource,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

/// Reasons a whole cycle stops before the user loop
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("No {0} available for this cycle")]
    InputGap(Collection),

    #[error("Failed to fetch {collection}: {source}")]
    Fetch {
        collection: Collection,
        #[source]
        source: ApiError,
    },

    #[error("Failed to embed job problem statements: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Failed to build job index: {0}")]
    Index(#[from] IndexError),

    #[error("A matching cycle is already running")]
    AlreadyRunning,
}

/// Why a user was left out without it counting as a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EmptyIntent,
}

/// What happened to one user during a cycle
#[derive(Debug, Clone, PartialEq)]
pub enum UserOutcome {
    /// Payload accepted by the recommendation store
    Submitted { jobs: usize, best_score: f64 },
    /// Nothing passed the filters; no submission was made
    NoCandidates,
    Skipped(SkipReason),
    SubmissionFailed(String),
    /// Malformed record or encoding failure for this user only
    MatchingFault(String),
}

/// Tally of one completed cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub jobs_indexed: usize,
    pub users_processed: usize,
    pub submitted: usize,
    pub skipped: usize,
    pub no_candidates: usize,
    pub submission_failures: usize,
    pub matching_faults: usize,
}

impl CycleSummary {
    fn start(cycle_id: Uuid, jobs_indexed: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            cycle_id,
            started_at,
            finished_at: started_at,
            jobs_indexed,
            users_processed: 0,
            submitted: 0,
            skipped: 0,
            no_candidates: 0,
            submission_failures: 0,
            matching_faults: 0,
        }
    }

    /// Count one user's outcome
    pub fn record(&mut self, outcome: &UserOutcome) {
        self.users_processed += 1;
        match outcome {
            UserOutcome::Submitted { .. } => self.submitted += 1,
            UserOutcome::NoCandidates => self.no_candidates += 1,
            UserOutcome::Skipped(_) => self.skipped += 1,
            UserOutcome::SubmissionFailed(_) => self.submission_failures += 1,
            UserOutcome::MatchingFault(_) => self.matching_faults += 1,
        }
    }
}

/// Drives one matching cycle end to end
///
/// Fetches the three collections, embeds every job once, then walks the
/// users in collection order. A failure for one user is recorded in the
/// summary and never stops the loop.
pub struct CycleRunner<S, E, K> {
    source: S,
    embedder: E,
    sink: K,
    matcher: Matcher,
    running: Mutex<()>,
    latest: RwLock<Option<CycleSummary>>,
}

impl<S, E, K> CycleRunner<S, E, K>
where
    S: RecordSource,
    E: Embedder,
    K: RecommendationSink,
{
    pub fn new(source: S, embedder: E, sink: K, matcher: Matcher) -> Self {
        Self {
            source,
            embedder,
            sink,
            matcher,
            running: Mutex::new(()),
            latest: RwLock::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Summary of the last cycle that completed, if any
    pub async fn latest(&self) -> Option<CycleSummary> {
        self.latest.read().await.clone()
    }

    /// Run one cycle; refuses to start while another is in progress
    pub async fn run_cycle(&self) -> Result<CycleSummary, CycleError> {
        let _running = self.running.try_lock().map_err(|_| CycleError::AlreadyRunning)?;

        let cycle_id = Uuid::new_v4();
        let result = self
            .execute(cycle_id)
            .instrument(tracing::info_span!("cycle", %cycle_id))
            .await;

        match &result {
            Ok(summary) => *self.latest.write().await = Some(summary.clone()),
            Err(e) => tracing::error!(%cycle_id, "Matching cycle aborted: {}", e),
        }

        result
    }

    async fn execute(&self, cycle_id: Uuid) -> Result<CycleSummary, CycleError> {
        let started_at = Utc::now();
        tracing::info!("Starting matching cycle");

        let users = self.fetch_required(Collection::Users).await?;
        let jobs = self.fetch_required(Collection::Jobs).await?;
        let swipes = match self.source.fetch_collection(Collection::Swipes).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Failed to fetch swipes, matching without exclusions: {}", e);
                Vec::new()
            }
        };

        let jobs = dedupe_jobs(decode_jobs(jobs));
        if jobs.is_empty() {
            return Err(CycleError::InputGap(Collection::Jobs));
        }

        let exclusions = ExclusionMap::from_swipes(&decode_swipes(swipes));
        tracing::debug!("Built exclusions for {} users", exclusions.user_count());

        let index = self.build_index(jobs).await?;
        tracing::info!("Indexed {} jobs, processing {} users", index.len(), users.len());

        let mut summary = CycleSummary::start(cycle_id, index.len(), started_at);
        for raw in users {
            let outcome = self.process_user(raw, &index, &exclusions).await;
            summary.record(&outcome);
        }
        summary.finished_at = Utc::now();

        tracing::info!(
            submitted = summary.submitted,
            skipped = summary.skipped,
            no_candidates = summary.no_candidates,
            submission_failures = summary.submission_failures,
            matching_faults = summary.matching_faults,
            "Matching cycle complete. Updated recommendations for {} of {} users",
            summary.submitted,
            summary.users_processed
        );

        Ok(summary)
    }

    async fn fetch_required(&self, collection: Collection) -> Result<Vec<Value>, CycleError> {
        let records = self
            .source
            .fetch_collection(collection)
            .await
            .map_err(|source| CycleError::Fetch { collection, source })?;

        if records.is_empty() {
            return Err(CycleError::InputGap(collection));
        }
        Ok(records)
    }

    /// Embed every job once; the index is shared by all users of the cycle
    async fn build_index(&self, jobs: Vec<JobRecord>) -> Result<JobIndex, CycleError> {
        let statements = JobIndex::problem_statements(&jobs);
        let embeddings = self.embedder.embed_batch(&statements).await?;
        Ok(JobIndex::new(jobs, embeddings)?)
    }

    /// Match and submit for one user
    pub async fn process_user(
        &self,
        raw: Value,
        index: &JobIndex,
        exclusions: &ExclusionMap,
    ) -> UserOutcome {
        let user: UserRecord = match serde_json::from_value(raw) {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("Skipping malformed user record: {}", e);
                return UserOutcome::MatchingFault(format!("malformed user record: {}", e));
            }
        };

        if let Err(e) = user.validate() {
            tracing::error!("Skipping invalid user record: {}", e);
            return UserOutcome::MatchingFault(format!("invalid user record: {}", e));
        }

        self.match_user(&user, index, exclusions.for_user(&user.id)).await
    }

    async fn match_user(
        &self,
        user: &UserRecord,
        index: &JobIndex,
        excluded_job_ids: &HashSet<String>,
    ) -> UserOutcome {
        if !user.has_intent() {
            tracing::warn!("User {} has empty intent text. Skipping.", user.id);
            return UserOutcome::Skipped(SkipReason::EmptyIntent);
        }

        let embedding = match self.embedder.embed(&user.intent_text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::error!("Failed to embed intent for user {}: {}", user.id, e);
                return UserOutcome::MatchingFault(e.to_string());
            }
        };

        if !is_finite_vector(&embedding) {
            tracing::error!("Embedding for user {} contains non-finite values", user.id);
            return UserOutcome::MatchingFault("non-finite user embedding".to_string());
        }

        if let Some(dimension) = index.dimension() {
            if embedding.len() != dimension {
                tracing::error!(
                    "Embedding width {} for user {} does not match job width {}",
                    embedding.len(),
                    user.id,
                    dimension
                );
                return UserOutcome::MatchingFault(format!(
                    "embedding width {} != {}",
                    embedding.len(),
                    dimension
                ));
            }
        }

        let result = self
            .matcher
            .find_matches(user, &embedding, index, excluded_job_ids);

        let Some(recommendation) = build_recommendation(&user.id, &result.matches) else {
            tracing::debug!("No admissible jobs for user {}", user.id);
            return UserOutcome::NoCandidates;
        };

        let jobs = recommendation.cooldown_job_ids.len();
        let best_score = recommendation.best_score;
        let payload = RecommendationPayload::from(recommendation);

        match self.sink.submit(&payload).await {
            Ok(()) => {
                tracing::info!(
                    "Updated recommendations for user {} with {} jobs (best {:.2}, {} admitted)",
                    user.id,
                    jobs,
                    best_score,
                    result.admitted
                );
                UserOutcome::Submitted { jobs, best_score }
            }
            Err(e) => {
                tracing::error!("Failed to update recommendations for user {}: {}", user.id, e);
                UserOutcome::SubmissionFailed(e.to_string())
            }
        }
    }
}

/// Decode job records, dropping the ones that are malformed or invalid
pub fn decode_jobs(raw: Vec<Value>) -> Vec<JobRecord> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<JobRecord>(value) {
            Ok(job) => match job.validate() {
                Ok(()) => Some(job),
                Err(e) => {
                    tracing::warn!("Dropping invalid job record: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Dropping malformed job record: {}", e);
                None
            }
        })
        .collect()
}

/// Decode swipe records, dropping malformed ones
pub fn decode_swipes(raw: Vec<Value>) -> Vec<SwipeRecord> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<SwipeRecord>(value) {
            Ok(swipe) => Some(swipe),
            Err(e) => {
                tracing::warn!("Dropping malformed swipe record: {}", e);
                None
            }
        })
        .collect()
}
