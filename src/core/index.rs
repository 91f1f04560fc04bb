use std::collections::HashSet;
use thiserror::Error;
use crate::models::JobRecord;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Embedding count mismatch: {jobs} jobs but {embeddings} embeddings")]
    LengthMismatch { jobs: usize, embeddings: usize },

    #[error("Embedding for job {job_id} has width {actual}, expected {expected}")]
    DimensionMismatch { job_id: String, expected: usize, actual: usize },

    #[error("Embedding for job {job_id} contains a non-finite value")]
    NonFinite { job_id: String },
}

/// Jobs of one cycle together with their order-aligned embeddings
///
/// Built once per cycle and only ever borrowed afterwards, so every user
/// in the cycle scores against the same vectors.
#[derive(Debug, Clone)]
pub struct JobIndex {
    jobs: Vec<JobRecord>,
    embeddings: Vec<Vec<f32>>,
}

impl JobIndex {
    /// Every row must be finite and as wide as the first one
    pub fn new(jobs: Vec<JobRecord>, embeddings: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        if jobs.len() != embeddings.len() {
            return Err(IndexError::LengthMismatch {
                jobs: jobs.len(),
                embeddings: embeddings.len(),
            });
        }

        let expected = embeddings.first().map(Vec::len).unwrap_or(0);
        for (job, embedding) in jobs.iter().zip(&embeddings) {
            if embedding.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    job_id: job.id.clone(),
                    expected,
                    actual: embedding.len(),
                });
            }
            if !is_finite_vector(embedding) {
                return Err(IndexError::NonFinite { job_id: job.id.clone() });
            }
        }

        Ok(Self { jobs, embeddings })
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    /// Embedding width, taken from the first job
    pub fn dimension(&self) -> Option<usize> {
        self.embeddings.first().map(Vec::len)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Texts to embed, in index order
    pub fn problem_statements(jobs: &[JobRecord]) -> Vec<String> {
        jobs.iter().map(|job| job.problem_statement.clone()).collect()
    }
}

/// `false` when any component is NaN or infinite
pub fn is_finite_vector(vector: &[f32]) -> bool {
    vector.iter().all(|v| v.is_finite())
}

/// Drop jobs whose identifier was already seen earlier in the collection
pub fn dedupe_jobs(jobs: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut seen = HashSet::with_capacity(jobs.len());
    jobs.into_iter()
        .filter(|job| {
            let first = seen.insert(job.id.clone());
            if !first {
                tracing::warn!("Dropping duplicate job {}", job.id);
            }
            first
        })
        .collect()
}
