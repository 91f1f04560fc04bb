// Service exports
pub mod api;
pub mod cache;
pub mod embedding;

pub use api::{ApiClient, ApiError, Collection, PagingOptions, RecommendationSink, RecordSource};
pub use cache::{CacheStats, CachedEmbedder};
pub use embedding::{Embedder, EmbeddingBackend, EmbeddingError, HashingEmbedder, HttpEmbedder};
