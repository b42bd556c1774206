use axum::{extract::State, routing::get, Json, Router};

use crate::state::{FeedStatus, SharedStatus};

#[derive(Clone)]
pub struct AppState {
    pub status: SharedStatus,
}

/// `/health` and `/status`. Merge `Metrics::router()` on top for `/metrics`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/status", get(status))
        .with_state(state)
}

async fn status(State(state): State<AppState>) -> Json<FeedStatus> {
    let snapshot = state
        .status
        .read()
        .unwrap_or_else(|p| p.into_inner())
        .clone();
    Json(snapshot)
}
