use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use validator::Validate;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub api: ApiSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Data API used both for reading collections and posting recommendations
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApiSettings {
    #[validate(url)]
    pub base_url: String,
    #[validate(length(min = 1, message = "API key is required"))]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            page_delay_ms: default_page_delay_ms(),
        }
    }
}

fn default_page_limit() -> u32 { 100 }
fn default_page_delay_ms() -> u64 { 200 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Sentence-embedding model behind an `/embeddings` endpoint
    Http,
    /// Lexical feature hashing; offline runs and tests only
    Hashing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_provider")]
    pub provider: EmbeddingProvider,
    pub endpoint: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    pub api_key: Option<String>,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_cache_size")]
    pub cache_size: u64,
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            model: default_model(),
            api_key: None,
            dimension: default_dimension(),
            batch_size: default_batch_size(),
            cache_size: default_cache_size(),
            timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

fn default_provider() -> EmbeddingProvider { EmbeddingProvider::Http }
fn default_model() -> String { "all-MiniLM-L6-v2".to_string() }
fn default_dimension() -> usize { 384 }
fn default_batch_size() -> usize { 64 }
fn default_cache_size() -> u64 { 10_000 }
fn default_embedding_timeout_secs() -> u64 { 60 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_semantic_weight")]
    pub semantic: f64,
    #[serde(default = "default_skills_weight")]
    pub skills: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            semantic: default_semantic_weight(),
            skills: default_skills_weight(),
        }
    }
}

fn default_semantic_weight() -> f64 { 0.6 }
fn default_skills_weight() -> f64 { 0.4 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// Run a single cycle and exit
    Once,
    /// Serve the HTTP control surface, optionally running cycles on a timer
    Serve,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_mode")]
    pub mode: EngineMode,
    pub interval_secs: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            interval_secs: None,
        }
    }
}

fn default_mode() -> EngineMode { EngineMode::Once }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with JOBMATCH_)
    /// 5. `BASE_URL` / `API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., JOBMATCH__API__BASE_URL -> api.base_url
            .add_source(
                Environment::with_prefix("JOBMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("JOBMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that would only fail later, mid-cycle
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid api settings: {}", e)))?;

        if self.embedding.provider == EmbeddingProvider::Http && self.embedding.endpoint.is_none() {
            return Err(ConfigError::Message(
                "embedding.endpoint is required for the http provider".to_string(),
            ));
        }

        let weights = &self.scoring.weights;
        if weights.semantic < 0.0 || weights.skills < 0.0 {
            return Err(ConfigError::Message("Scoring weights must be non-negative".to_string()));
        }
        if weights.semantic + weights.skills > 1.0 + f64::EPSILON {
            tracing::warn!(
                "Scoring weights sum to {}, composite scores may exceed 1.0",
                weights.semantic + weights.skills
            );
        }

        Ok(())
    }
}

/// Apply the deployment's plain `BASE_URL` and `API_KEY` variables
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(base_url) = env::var("BASE_URL") {
        builder = builder.set_override("api.base_url", base_url)?;
    }
    if let Ok(api_key) = env::var("API_KEY") {
        builder = builder.set_override("api.api_key", api_key)?;
    }

    builder.build()
}
