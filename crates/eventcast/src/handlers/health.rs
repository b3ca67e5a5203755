//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Process status without touching any upstream

use axum::{extract::State, http::StatusCode, Json};

use crate::state::AppState;

/// GET /livez - Basic liveness probe.
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Reports the serving timezone and window.
///
/// Never calls upstream or the cache, so it stays fast under upstream
/// outages.
pub async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timezone": state.timezone.name(),
        "recent_days": state.recent_days,
    }))
}
