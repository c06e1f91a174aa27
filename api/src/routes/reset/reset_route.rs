//! POST /reset — clears a session's transcript and reseeds the greeting.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::Response};
use serde::Deserialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

/// Request payload for /reset.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Handler: POST /reset
pub async fn reset_conversation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetRequest>,
) -> Response {
    let session = body.session_id.as_deref().unwrap_or("default");

    let transcript = state.sessions.get_or_seed(session).await;
    transcript.lock().await.reset();
    tracing::info!(session, "conversation reset");

    ApiResponse::success(serde_json::json!({ "session_id": session }))
        .into_response_with_status(StatusCode::OK)
}
