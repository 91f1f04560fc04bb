use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of a data API collection
///
/// Records are kept as raw JSON so a single malformed record can be
/// rejected on its own instead of failing the whole page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataPage {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
