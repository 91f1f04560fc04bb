use reqwest::Client;
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while embedding text
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Embedding service returned error: {0}")]
    ServiceError(String),

    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Invalid embedding configuration: {0}")]
    InvalidConfig(String),
}

/// Text → fixed-length vector
pub trait Embedder: Send + Sync {
    /// Embed many texts; the output is aligned with the input
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send;

    /// Embed a single text
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbeddingError>> + Send {
        let texts = vec![text.to_string()];
        async move {
            let mut vectors = self.embed_batch(&texts).await?;
            if vectors.len() != 1 {
                return Err(EmbeddingError::CountMismatch {
                    expected: 1,
                    actual: vectors.len(),
                });
            }
            Ok(vectors.swap_remove(0))
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible `/embeddings` endpoint
///
/// Sentence-transformer servers (TEI, infinity, vLLM) all speak this shape,
/// so the model behind it stays a black box.
pub struct HttpEmbedder {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    batch_size: usize,
    client: Client,
}

impl HttpEmbedder {
    pub fn new(
        endpoint: String,
        model: String,
        api_key: Option<String>,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        if batch_size == 0 {
            return Err(EmbeddingError::InvalidConfig("batch_size must be positive".into()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            model,
            api_key: api_key.filter(|key| !key.is_empty()),
            batch_size,
            client,
        })
    }

    async fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut request = self.client.post(&self.endpoint).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ServiceError(format!("{} - {}", status, body)));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::ServiceError(format!("Failed to parse response: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: parsed.data.len(),
            });
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

impl Embedder for HttpEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_chunk(chunk).await?);
        }
        tracing::debug!("Embedded {} texts with {}", texts.len(), self.model);
        Ok(vectors)
    }
}

// Fixed keys: changing them changes every vector.
const HASH_KEY_0: u64 = 0x6a6f_626d_6174_6368;
const HASH_KEY_1: u64 = 0x7365_6d61_6e74_6963;

/// Deterministic feature-hashing embedder
///
/// Lower-cased word tokens are hashed into a fixed number of signed
/// buckets and the vector is L2-normalised. No model files, no network:
/// used for offline runs and tests. Empty text embeds to the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn hash_token(token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_KEY_0, HASH_KEY_1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        let lowered = text.to_lowercase();
        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let hash = Self::hash_token(token);
            let idx = (hash % self.dimension as u64) as usize;
            // Top bit picks the sign so collisions partly cancel
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Embedding backend selected from configuration
pub enum EmbeddingBackend {
    Http(HttpEmbedder),
    Hashing(HashingEmbedder),
}

impl Embedder for EmbeddingBackend {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match self {
            EmbeddingBackend::Http(embedder) => embedder.embed_batch(texts).await,
            EmbeddingBackend::Hashing(embedder) => embedder.embed_batch(texts).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cosine_similarity;
    use serde_json::json;

    #[test]
    fn test_hashing_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64);

        let a = embedder.embed_text("Build data pipelines in Python");
        let b = embedder.embed_text("build DATA pipelines in python!");

        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hashing_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        assert!(embedder.embed_text("   ").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_hashing_similarity_tracks_shared_words() {
        let embedder = HashingEmbedder::new(256);
        let query = embedder.embed_text("machine learning engineer");
        let close = embedder.embed_text("senior machine learning engineer");
        let far = embedder.embed_text("pastry chef bakery");

        assert!(cosine_similarity(&query, &close) > cosine_similarity(&query, &far));
    }

    #[tokio::test]
    async fn test_embed_single_uses_batch() {
        let embedder = HashingEmbedder::new(8);
        let vector = embedder.embed("rust").await.unwrap();
        assert_eq!(vector.len(), 8);
    }

    #[test]
    fn test_http_embedder_rejects_zero_batch() {
        let result = HttpEmbedder::new(
            "http://localhost/embeddings".to_string(),
            "all-MiniLM-L6-v2".to_string(),
            None,
            0,
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(EmbeddingError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_http_embedder_batches_and_orders() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/embeddings")
            .match_body(mockito::Matcher::PartialJson(json!({"input": ["a", "b"]})))
            .with_status(200)
            .with_body(
                json!({"data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]},
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        let second = server
            .mock("POST", "/embeddings")
            .match_body(mockito::Matcher::PartialJson(json!({"input": ["c"]})))
            .with_status(200)
            .with_body(json!({"data": [{"index": 0, "embedding": [0.5, 0.5]}]}).to_string())
            .create_async()
            .await;

        let embedder = HttpEmbedder::new(
            format!("{}/embeddings", server.url()),
            "all-MiniLM-L6-v2".to_string(),
            Some("secret".to_string()),
            2,
            Duration::from_secs(5),
        )
        .unwrap();

        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let vectors = embedder.embed_batch(&texts).await.unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_embedder_count_mismatch() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(json!({"data": []}).to_string())
            .create_async()
            .await;

        let embedder = HttpEmbedder::new(
            format!("{}/embeddings", server.url()),
            "all-MiniLM-L6-v2".to_string(),
            None,
            8,
            Duration::from_secs(5),
        )
        .unwrap();

        let result = embedder.embed("hello").await;
        assert!(matches!(result, Err(EmbeddingError::CountMismatch { expected: 1, actual: 0 })));
    }
}
