//! HTTP gateway (Axum) for recipe search.
//!
//! This module is primarily used by the `gastrogenie` server binary.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handler::{LLM_CARD_TITLE, chat_handler, models_handler};
pub use state::HandlerState;

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/models", get(models_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub recipes: usize,
    pub index_vectors: usize,
    pub embedder_mode: &'static str,
    pub reranker_mode: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let pipeline = &state.pipeline;

    let components = ComponentStatus {
        http: "ready",
        recipes: pipeline.table().len(),
        index_vectors: pipeline.index_len(),
        embedder_mode: if pipeline.embedder().is_stub() {
            "stub"
        } else {
            "real"
        },
        reranker_mode: if pipeline.reranker().is_model_loaded() {
            "real"
        } else {
            "stub"
        },
    };

    // The pipeline constructor already enforced table/index alignment; a
    // ready process with zero recipes still reports unavailable.
    let is_ready = components.recipes > 0 && components.recipes == components.index_vectors;

    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    (
        status_code,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
