use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use jobmatch_engine::config::{EmbeddingProvider, EngineMode, LoggingSettings, Settings};
use jobmatch_engine::core::Matcher;
use jobmatch_engine::cycle::{CycleError, CycleRunner};
use jobmatch_engine::models::ScoringWeights;
use jobmatch_engine::routes::{self, cycles::{AppState, ServiceRunner}};
use jobmatch_engine::services::{
    ApiClient, CachedEmbedder, EmbeddingBackend, HashingEmbedder, HttpEmbedder, PagingOptions,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// `LOG_LEVEL` and `LOG_FORMAT` win over the config file
fn init_tracing(logging: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn io_error(message: String) -> std::io::Error {
    std::io::Error::other(message)
}

/// Wire the data API client, the embedder and the matcher together
fn build_runner(settings: &Settings) -> std::io::Result<ServiceRunner> {
    let paging = PagingOptions {
        page_limit: settings.fetch.page_limit,
        page_delay: Duration::from_millis(settings.fetch.page_delay_ms),
    };

    let api = Arc::new(
        ApiClient::new(
            settings.api.base_url.clone(),
            settings.api.api_key.clone(),
            Duration::from_secs(settings.api.timeout_secs),
            paging,
        )
        .map_err(|e| io_error(format!("Failed to build API client: {}", e)))?,
    );

    info!("API client initialized for {}", settings.api.base_url);

    let embedding = &settings.embedding;
    let backend = match embedding.provider {
        EmbeddingProvider::Http => {
            let endpoint = embedding
                .endpoint
                .clone()
                .ok_or_else(|| io_error("embedding.endpoint is required".to_string()))?;
            let embedder = HttpEmbedder::new(
                endpoint,
                embedding.model.clone(),
                embedding.api_key.clone(),
                embedding.batch_size,
                Duration::from_secs(embedding.timeout_secs),
            )
            .map_err(|e| io_error(format!("Failed to build embedder: {}", e)))?;
            info!("Using embedding model {}", embedding.model);
            EmbeddingBackend::Http(embedder)
        }
        EmbeddingProvider::Hashing => {
            warn!(
                "Using the hashing embedder ({} dimensions): similarity is lexical, not semantic",
                embedding.dimension
            );
            EmbeddingBackend::Hashing(HashingEmbedder::new(embedding.dimension))
        }
    };

    let embedder = CachedEmbedder::new(backend, embedding.cache_size);

    info!("Embedding cache initialized ({} entries)", embedding.cache_size);

    let weights = ScoringWeights {
        semantic: settings.scoring.weights.semantic,
        skills: settings.scoring.weights.skills,
    };

    info!("Matcher initialized with weights: {:?}", weights);

    Ok(CycleRunner::new(Arc::clone(&api), embedder, api, Matcher::new(weights)))
}

/// Run cycles on a fixed period for as long as the server lives
fn spawn_scheduler(runner: Arc<ServiceRunner>, period: Duration) {
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if let Err(CycleError::AlreadyRunning) = runner.run_cycle().await {
                warn!("Scheduled cycle skipped, previous cycle still running");
            }
        }
    });
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging);

    info!("Starting job matching engine...");

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully");

    let runner = Arc::new(build_runner(&settings)?);

    if settings.engine.mode == EngineMode::Once {
        return match runner.run_cycle().await {
            Ok(summary) => {
                info!(
                    "Cycle {} finished: {} of {} users updated",
                    summary.cycle_id, summary.submitted, summary.users_processed
                );
                Ok(())
            }
            Err(CycleError::InputGap(collection)) => {
                warn!("No {} found, nothing to match", collection);
                Ok(())
            }
            Err(e) => Err(io_error(e.to_string())),
        };
    }

    if let Some(secs) = settings.engine.interval_secs.filter(|s| *s > 0) {
        info!("Scheduling a matching cycle every {}s", secs);
        spawn_scheduler(Arc::clone(&runner), Duration::from_secs(secs));
    }

    let app_state = AppState { runner };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
