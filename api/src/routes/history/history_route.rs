//! GET /history — full display transcript for a session.
//!
//! Unbounded: the sliding window only applies to summarization, never to
//! what the user sees.

use std::sync::Arc;

use axum::{Json, extract::{Query, State}};
use companion_core::Turn;
use serde::Deserialize;

use crate::core::app_state::AppState;

/// Query parameters for /history.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Handler: GET /history
pub async fn conversation_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<Turn>> {
    let session = params.session_id.as_deref().unwrap_or("default");
    let transcript = state.sessions.get_or_seed(session).await;
    let transcript = transcript.lock().await;
    Json(transcript.turns().to_vec())
}
