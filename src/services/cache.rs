use crate::services::embedding::{Embedder, EmbeddingError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Embedding cache in front of any [`Embedder`]
///
/// Keyed by the exact text, so a job whose problem statement did not change
/// since the previous cycle is not sent to the model again. Memory only,
/// nothing is written to disk.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: moka::future::Cache<String, Arc<Vec<f32>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<E: Embedder> CachedEmbedder<E> {
    /// Create a new cache holding at most `capacity` vectors
    pub fn new(inner: E, capacity: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity).build();

        Self {
            inner,
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            entries: self.cache.entry_count(),
            hit_count: hits,
            miss_count: misses,
            hit_rate: if total > 0 { hits as f64 / total as f64 } else { 0.0 },
        }
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors: Vec<Option<Arc<Vec<f32>>>> = Vec::with_capacity(texts.len());
        let mut missing: Vec<String> = Vec::new();
        let mut missing_slots: Vec<usize> = Vec::new();

        for (slot, text) in texts.iter().enumerate() {
            match self.cache.get(text).await {
                Some(vector) => vectors.push(Some(vector)),
                None => {
                    vectors.push(None);
                    missing.push(text.clone());
                    missing_slots.push(slot);
                }
            }
        }

        let missing_count = missing.len();
        self.hits.fetch_add((texts.len() - missing_count) as u64, Ordering::Relaxed);
        self.misses.fetch_add(missing_count as u64, Ordering::Relaxed);

        if !missing.is_empty() {
            let fresh = self.inner.embed_batch(&missing).await?;
            if fresh.len() != missing.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: missing.len(),
                    actual: fresh.len(),
                });
            }

            for ((slot, text), vector) in missing_slots.into_iter().zip(missing).zip(fresh) {
                let vector = Arc::new(vector);
                self.cache.insert(text, Arc::clone(&vector)).await;
                vectors[slot] = Some(vector);
            }
        }

        tracing::trace!("Embedding cache: {} texts, {} misses", texts.len(), missing_count);

        vectors
            .into_iter()
            .map(|v| v.map(|arc| arc.as_ref().clone()))
            .collect::<Option<Vec<_>>>()
            .ok_or(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: texts.len() - missing_count,
            })
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
}
