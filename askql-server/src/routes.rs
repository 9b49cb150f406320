//! HTTP routes: banner, health, question answering and metrics.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use askql_pipeline::{ResponseEnvelope, ServiceState};

use crate::metrics::ServerMetrics;

/// Application state shared across handlers
pub struct AppState {
    pub service: ServiceState,
    pub metrics: ServerMetrics,
}

impl AppState {
    pub fn new(service: ServiceState, metrics: ServerMetrics) -> Self {
        metrics.initialized.set(i64::from(service.is_healthy()));
        Self { service, metrics }
    }
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ask", post(ask))
        .route("/metrics", get(metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "askql question answering API",
        "endpoints": {
            "health": "GET /health",
            "ask": "POST /ask",
            "metrics": "GET /metrics"
        }
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    let timestamp = Utc::now().to_rfc3339();
    match &state.service {
        ServiceState::Ready(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                timestamp,
                detail: None,
            }),
        )
            .into_response(),
        ServiceState::Degraded { reason } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                timestamp,
                detail: Some(reason.clone()),
            }),
        )
            .into_response(),
    }
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<ResponseEnvelope>, (StatusCode, String)> {
    let pipeline = state.service.pipeline().cloned().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "Question answering pipeline not initialized".to_string(),
    ))?;

    let question = req.question;
    if question.trim().is_empty() {
        warn!("Rejected request with empty question");
        return Err((
            StatusCode::BAD_REQUEST,
            "Question cannot be empty".to_string(),
        ));
    }

    let envelope = tokio::spawn(async move { pipeline.answer(&question).await })
        .await
        .map_err(|e| {
            error!("Pipeline task aborted: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Pipeline task aborted: {}", e),
            )
        })?;

    state
        .metrics
        .record_answer(envelope.status, envelope.data.tokens_used);
    Ok(Json(envelope))
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.encode()
}
