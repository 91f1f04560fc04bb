use actix_web::{web, HttpResponse, Responder};
use crate::cycle::{CycleError, CycleRunner};
use crate::models::{ErrorResponse, HealthResponse};
use crate::services::{ApiClient, CachedEmbedder, EmbeddingBackend};
use std::sync::Arc;

/// Runner wired to the live data API and the configured embedder
pub type ServiceRunner = CycleRunner<Arc<ApiClient>, CachedEmbedder<EmbeddingBackend>, Arc<ApiClient>>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<ServiceRunner>,
}

/// Configure all cycle-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/cycles/run", web::post().to(run_cycle))
        .route("/cycles/latest", web::get().to(latest_cycle));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Trigger a matching cycle
///
/// POST /api/v1/cycles/run
///
/// Blocks until the cycle finishes and returns its summary.
async fn run_cycle(state: web::Data<AppState>) -> impl Responder {
    tracing::info!("Matching cycle requested over HTTP");

    match state.runner.run_cycle().await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => cycle_error_response(&e),
    }
}

/// Summary of the last completed cycle
///
/// GET /api/v1/cycles/latest
async fn latest_cycle(state: web::Data<AppState>) -> impl Responder {
    match state.runner.latest().await {
        Some(summary) => HttpResponse::Ok().json(summary),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "No cycle completed".to_string(),
            message: "No matching cycle has completed since startup".to_string(),
            status_code: 404,
        }),
    }
}

/// Map a cycle abort onto a status code
pub fn cycle_error_response(error: &CycleError) -> HttpResponse {
    let (mut builder, label, status_code) = match error {
        CycleError::AlreadyRunning => (HttpResponse::Conflict(), "Cycle already running", 409),
        CycleError::InputGap(_) => (HttpResponse::UnprocessableEntity(), "Missing input data", 422),
        CycleError::Fetch { .. } | CycleError::Embedding(_) => {
            (HttpResponse::BadGateway(), "Upstream failure", 502)
        }
        CycleError::Index(_) => (HttpResponse::InternalServerError(), "Index build failed", 500),
    };

    builder.json(ErrorResponse {
        error: label.to_string(),
        message: error.to_string(),
        status_code,
    })
}
