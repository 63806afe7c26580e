//! # forecast_server
//!
//! Read-only HTTP API over the artifacts of the latest training run.
//!
//! | route | body |
//! |-------|------|
//! | `GET /api/forecast` | persisted forecast payload |
//! | `GET /api/metrics` | persisted run metrics |
//! | `GET /health` | liveness and version |
//!
//! Missing artifacts answer 503 until a training run has completed.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use forecast_pipeline::{ArtifactSlot, ArtifactStore, ForecastError};
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Body of every 503 answer
pub const NOT_TRAINED_MESSAGE: &str = "Model not trained yet";

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    store: ArtifactStore,
}

/// Failure of an API request
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested artifact has not been written yet
    #[error("{slot} artifact has not been written")]
    NotTrained { slot: ArtifactSlot },

    /// The artifact exists but could not be read or parsed
    #[error("failed to read artifact: {0}")]
    Artifact(ForecastError),

    /// The blocking read task panicked or was cancelled
    #[error("artifact read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::ArtifactMissing(slot) => ApiError::NotTrained { slot },
            other => ApiError::Artifact(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotTrained { slot } => {
                debug!(%slot, "artifact requested before training");
                (StatusCode::SERVICE_UNAVAILABLE, NOT_TRAINED_MESSAGE.to_string())
            }
            ApiError::Artifact(_) | ApiError::Task(_) => {
                error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Router serving the artifacts of `store`, with permissive CORS and
/// request tracing
pub fn build_router(store: ArtifactStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/forecast", get(forecast))
        .route("/api/metrics", get(metrics))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { store })
}

async fn forecast(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    read_artifact(state.store, ArtifactSlot::Forecast).await
}

async fn metrics(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    read_artifact(state.store, ArtifactSlot::Metrics).await
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Read a slot on the blocking pool and return it as persisted
async fn read_artifact(store: ArtifactStore, slot: ArtifactSlot) -> Result<Json<Value>, ApiError> {
    let value = tokio::task::spawn_blocking(move || store.read_raw(slot)).await??;
    Ok(Json(value))
}
