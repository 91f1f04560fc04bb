// Shared fixtures for the integration tests
#![allow(dead_code)]

use jobmatch_engine::models::RecommendationPayload;
use jobmatch_engine::services::{
    ApiError, Collection, Embedder, EmbeddingError, RecommendationSink, RecordSource,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Record source backed by fixed collections
#[derive(Default)]
pub struct InMemorySource {
    pub collections: HashMap<Collection, Vec<Value>>,
    pub failing: HashSet<Collection>,
}

impl InMemorySource {
    pub fn new(users: Vec<Value>, jobs: Vec<Value>, swipes: Vec<Value>) -> Self {
        let mut collections = HashMap::new();
        collections.insert(Collection::Users, users);
        collections.insert(Collection::Jobs, jobs);
        collections.insert(Collection::Swipes, swipes);
        Self {
            collections,
            failing: HashSet::new(),
        }
    }

    pub fn failing_on(mut self, collection: Collection) -> Self {
        self.failing.insert(collection);
        self
    }
}

impl RecordSource for InMemorySource {
    async fn fetch_collection(&self, collection: Collection) -> Result<Vec<Value>, ApiError> {
        if self.failing.contains(&collection) {
            return Err(ApiError::InvalidResponse(format!("{} unavailable", collection)));
        }
        Ok(self.collections.get(&collection).cloned().unwrap_or_default())
    }
}

/// Source that parks on its first fetch until released
pub struct GatedSource {
    pub inner: InMemorySource,
    pub entered: Notify,
    pub release: Notify,
}

impl RecordSource for GatedSource {
    async fn fetch_collection(&self, collection: Collection) -> Result<Vec<Value>, ApiError> {
        if collection == Collection::Users {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.fetch_collection(collection).await
    }
}

/// Sink that keeps every accepted payload and rejects listed users
#[derive(Default)]
pub struct RecordingSink {
    pub payloads: Mutex<Vec<RecommendationPayload>>,
    pub reject_users: HashSet<String>,
}

impl RecordingSink {
    pub fn rejecting(user_ids: &[&str]) -> Self {
        Self {
            payloads: Mutex::new(Vec::new()),
            reject_users: user_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn payloads(&self) -> Vec<RecommendationPayload> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn payload_for(&self, user_id: &str) -> Option<RecommendationPayload> {
        self.payloads().into_iter().find(|p| p.user_id == user_id)
    }
}

impl RecommendationSink for RecordingSink {
    async fn submit(&self, payload: &RecommendationPayload) -> Result<(), ApiError> {
        if self.reject_users.contains(&payload.user_id) {
            return Err(ApiError::InvalidResponse("rejected".to_string()));
        }
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

/// Embedder returning hand-picked vectors so scores are exact
pub struct TableEmbedder {
    pub vectors: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub fn new(entries: &[(&str, [f32; 2])]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(text, v)| (text.to_string(), v.to_vec()))
                .collect(),
        }
    }
}

impl Embedder for TableEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts
            .iter()
            .map(|text| {
                self.vectors
                    .get(text)
                    .cloned()
                    .ok_or_else(|| EmbeddingError::ServiceError(format!("no vector for '{}'", text)))
            })
            .collect()
    }
}

pub fn create_test_user(id: &str, intent: &str, skills: &[&str]) -> Value {
    json!({
        "user_id": id,
        "intent_text": intent,
        "skills": skills,
        "constraints": {"remote_only": true, "preferred_locations": [], "preferred_salary": 0}
    })
}

pub fn create_test_job(id: &str, statement: &str, skills: &[&str]) -> Value {
    json!({
        "job_id": id,
        "problem_statement": statement,
        "skills_required": skills,
        "constraints": {"location": "Remote", "salary_range": [50000, 150000]}
    })
}

pub fn create_test_swipe(user_id: &str, job_id: &str, direction: &str) -> Value {
    json!({"user_id": user_id, "job_id": job_id, "direction": direction})
}

/// Four jobs laid out on the unit circle, plus the intents pointing at them
pub fn create_test_embedder() -> TableEmbedder {
    TableEmbedder::new(&[
        ("Build payment APIs", [1.0, 0.0]),
        ("Own the data warehouse", [0.8, 0.6]),
        ("Ship the design system", [0.0, 1.0]),
        ("Scale the ML platform", [0.6, 0.8]),
        ("I want backend work", [1.0, 0.0]),
        ("I like frontend", [0.0, 1.0]),
    ])
}

pub fn create_test_jobs() -> Vec<Value> {
    vec![
        create_test_job("j1", "Build payment APIs", &["python", "sql"]),
        create_test_job("j2", "Own the data warehouse", &["sql"]),
        create_test_job("j3", "Ship the design system", &["react", "css"]),
        create_test_job("j4", "Scale the ML platform", &["python"]),
    ]
}
