//! Liveness probe.

use axum::Json;
use serde_json::{json, Value};

/// Health check handler.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
