//! GET /health — reachability of the managed platform endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use cortex_client::HealthStatus;

use crate::core::app_state::AppState;

/// Handler: GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(state.health.check(&state.account_url).await)
}
