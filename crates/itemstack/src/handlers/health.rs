//! Liveness endpoint.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health - Returns 200 with the entity type the API serves.
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "entityType": state.engine.entity_type(),
    }))
}
