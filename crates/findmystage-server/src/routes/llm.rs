//! LLM key management: /api/llm/*.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use findmystage_chat::providers;
use findmystage_chat::types::*;
use tracing::{info, warn};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/llm/config", get(get_config).put(update_config))
        .route("/llm/config/test", post(test_key))
}

async fn get_config(State(state): State<Arc<AppState>>) -> Json<LLMConfigResponse> {
    Json(state.llm_config.read().to_response())
}

async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<LLMConfigUpdate>,
) -> impl IntoResponse {
    let mut config = state.llm_config.write();
    // The live config only changes once the update is on disk.
    let mut updated = config.clone();
    updated.apply_update(&update);

    if let Err(e) = updated.save() {
        warn!("Failed to save LLM config: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": format!("Failed to save config: {}", e) })),
        );
    }
    *config = updated;
    info!(
        "LLM config updated; active provider: {:?}",
        config.resolve_provider().map(|(p, _, _)| p)
    );

    match serde_json::to_value(config.to_response()) {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

async fn test_key(Json(req): Json<TestKeyRequest>) -> Json<serde_json::Value> {
    match providers::test_api_key(&req.provider, &req.api_key).await {
        Ok(()) => Json(serde_json::json!({ "success": true })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e })),
    }
}
