// handlers/public/health.rs - GET / and GET /health

use axum::extract::State;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn root() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "public": ["/auth/user/register", "/auth/:role/login", "/verification/send", "/verification/verify"],
            "gated": ["/api/user", "/api/provider", "/api/manager", "/api/admin", "/api/superuser"]
        }
    })))
}

/// Reports store reachability; the service itself is up if this answers.
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let store = match state.store.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!("Health check: store unavailable: {}", e);
            "unavailable"
        }
    };
    Ok(ApiResponse::success(json!({
        "status": "ok",
        "store": store,
        "time": state.now(),
    })))
}
