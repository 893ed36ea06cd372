use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = state.stats.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "proxied_total": stats.proxied_total,
        "rejected_total": stats.rejected_total,
        "upstream_errors_total": stats.upstream_errors_total,
    }))
}
