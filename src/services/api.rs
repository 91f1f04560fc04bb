use crate::models::{DataPage, RecommendationPayload};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the data API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {status} - {body}")]
    ApiError { status: StatusCode, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// The three record collections a matching cycle reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Jobs,
    Swipes,
}

impl Collection {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Collection::Users => "/ai/data/users",
            Collection::Jobs => "/ai/data/jobs",
            Collection::Swipes => "/ai/data/swipes",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Collection::Users => "users",
            Collection::Jobs => "jobs",
            Collection::Swipes => "swipes",
        };
        f.write_str(name)
    }
}

/// Source of raw records for a cycle
pub trait RecordSource: Send + Sync {
    /// Fetch every record of a collection, following pagination
    fn fetch_collection(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<Value>, ApiError>> + Send;
}

/// Destination for per-user recommendations
pub trait RecommendationSink: Send + Sync {
    /// Submit one user's payload; any error is that user's failure alone
    fn submit(
        &self,
        payload: &RecommendationPayload,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl<T: RecordSource> RecordSource for Arc<T> {
    fn fetch_collection(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<Value>, ApiError>> + Send {
        (**self).fetch_collection(collection)
    }
}

impl<T: RecommendationSink> RecommendationSink for Arc<T> {
    fn submit(
        &self,
        payload: &RecommendationPayload,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).submit(payload)
    }
}

/// Pagination settings for collection reads
#[derive(Debug, Clone, Copy)]
pub struct PagingOptions {
    pub page_limit: u32,
    pub page_delay: Duration,
}

impl Default for PagingOptions {
    fn default() -> Self {
        Self {
            page_limit: 100,
            page_delay: Duration::from_millis(200),
        }
    }
}

/// Client for the platform's AI data API
///
/// Handles all communication with the backend including:
/// - Reading users, jobs and swipes page by page
/// - Posting recommendation updates
pub struct ApiClient {
    base_url: String,
    api_key: String,
    client: Client,
    paging: PagingOptions,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(
        base_url: String,
        api_key: String,
        timeout: Duration,
        paging: PagingOptions,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            paging,
        })
    }

    async fn fetch_page(
        &self,
        collection: Collection,
        cursor: Option<&str>,
    ) -> Result<DataPage, ApiError> {
        let url = format!("{}{}", self.base_url, collection.endpoint());

        let mut query = vec![("limit", self.paging.page_limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(ApiError::ApiError { status, body });
        }

        response
            .json::<DataPage>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {} page: {}", collection, e)))
    }
}

impl RecordSource for ApiClient {
    /// A failure on the first page is returned as an error. A failure on a
    /// later page stops pagination and keeps what was already fetched.
    async fn fetch_collection(&self, collection: Collection) -> Result<Vec<Value>, ApiError> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        tracing::info!("Fetching {} from {}", collection, collection.endpoint());

        loop {
            let page = match self.fetch_page(collection, cursor.as_deref()).await {
                Ok(page) => page,
                Err(e) if page_count == 0 => return Err(e),
                Err(e) => {
                    tracing::error!(
                        "Failed to fetch {} page {}, keeping {} records: {}",
                        collection,
                        page_count + 1,
                        records.len(),
                        e
                    );
                    break;
                }
            };

            if page.data.is_empty() {
                tracing::debug!("No more {} to fetch", collection);
                break;
            }

            page_count += 1;
            tracing::debug!("{} page {} fetched ({} items)", collection, page_count, page.data.len());
            records.extend(page.data);

            cursor = match page.next_cursor {
                Some(next) if !next.is_empty() => Some(next),
                _ => break,
            };

            tokio::time::sleep(self.paging.page_delay).await;
        }

        tracing::info!("Fetched {} {} in {} pages", records.len(), collection, page_count);

        Ok(records)
    }
}

impl RecommendationSink for ApiClient {
    async fn submit(&self, payload: &RecommendationPayload) -> Result<(), ApiError> {
        let url = format!("{}/ai/recommendations/update", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(ApiError::ApiError { status, body });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PositiveSignals, SuppressionRules};
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(
            server.url(),
            "test_key".to_string(),
            Duration::from_secs(5),
            PagingOptions {
                page_limit: 2,
                page_delay: Duration::ZERO,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_api_client_creation() {
        let client = ApiClient::new(
            "https://api.test/".to_string(),
            "test_key".to_string(),
            Duration::from_secs(30),
            PagingOptions::default(),
        )
        .unwrap();

        assert_eq!(client.base_url, "https://api.test");
        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.paging.page_limit, 100);
    }

    #[test]
    fn test_collection_endpoints() {
        assert_eq!(Collection::Users.endpoint(), "/ai/data/users");
        assert_eq!(Collection::Jobs.endpoint(), "/ai/data/jobs");
        assert_eq!(Collection::Swipes.endpoint(), "/ai/data/swipes");
    }

    #[tokio::test]
    async fn test_fetch_follows_cursor() {
        let mut server = mockito::Server::new_async().await;

        let first = server
            .mock("GET", "/ai/data/jobs")
            .match_header("X-API-KEY", "test_key")
            .match_query(Matcher::Exact("limit=2".into()))
            .with_status(200)
            .with_body(json!({"data": [{"job_id": "j1"}, {"job_id": "j2"}], "next_cursor": "c2"}).to_string())
            .create_async()
            .await;
        let second = server
            .mock("GET", "/ai/data/jobs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "2".into()),
                Matcher::UrlEncoded("cursor".into(), "c2".into()),
            ]))
            .with_status(200)
            .with_body(json!({"data": [{"job_id": "j3"}], "next_cursor": null}).to_string())
            .create_async()
            .await;

        let records = client_for(&server).fetch_collection(Collection::Jobs).await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[2]["job_id"], "j3");
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_first_page_failure_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ai/data/users")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("invalid key")
            .create_async()
            .await;

        let result = client_for(&server).fetch_collection(Collection::Users).await;

        assert!(matches!(result, Err(ApiError::ApiError { status, .. }) if status == StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_fetch_later_page_failure_keeps_partial() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ai/data/swipes")
            .match_query(Matcher::Exact("limit=2".into()))
            .with_status(200)
            .with_body(json!({"data": [{"user_id": "u1", "job_id": "j1"}], "next_cursor": "c2"}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/ai/data/swipes")
            .match_query(Matcher::UrlEncoded("cursor".into(), "c2".into()))
            .with_status(500)
            .create_async()
            .await;

        let records = client_for(&server).fetch_collection(Collection::Swipes).await.unwrap();

        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_posts_payload() {
        let mut server = mockito::Server::new_async().await;
        let payload = RecommendationPayload {
            user_id: "u1".to_string(),
            positive_signals: PositiveSignals {
                predicted_match_score: 0.68,
                affinity_clusters: vec![],
            },
            suppression_rules: SuppressionRules {
                cooldown_job_ids: vec!["j1".to_string()],
            },
        };

        let mock = server
            .mock("POST", "/ai/recommendations/update")
            .match_header("X-API-KEY", "test_key")
            .match_body(Matcher::Json(serde_json::to_value(&payload).unwrap()))
            .with_status(200)
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;

        client_for(&server).submit(&payload).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_non_ok_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/ai/recommendations/update")
            .with_status(201)
            .create_async()
            .await;

        let payload = RecommendationPayload {
            user_id: "u1".to_string(),
            positive_signals: PositiveSignals {
                predicted_match_score: 0.5,
                affinity_clusters: vec![],
            },
            suppression_rules: SuppressionRules {
                cooldown_job_ids: vec![],
            },
        };

        assert!(client_for(&server).submit(&payload).await.is_err());
    }
}
