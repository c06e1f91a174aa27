//! POST /ask — answers one conversational turn with retrieved context.

use std::sync::Arc;

use axum::{Json, extract::State};

use companion_core::TurnOptions;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::ask::ask_request::{AskRequest, AskResponse},
};

const DEFAULT_SESSION: &str = "default";

/// Handler: POST /ask
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is the minimum balance?","session_id":"abc"}'
/// ```
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AskRequest>,
) -> AppResult<Json<AskResponse>> {
    if body.question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".into()));
    }

    // Build TurnOptions (fallback to configured defaults if omitted)
    let mut opts = TurnOptions::default();
    if let Some(k) = body.top_k {
        opts.top_k = k.max(1);
    }
    opts.model = body.model;

    let session = body.session_id.as_deref().unwrap_or(DEFAULT_SESSION);
    let transcript = state.sessions.get_or_seed(session).await;
    let mut transcript = transcript.lock().await;

    let outcome = state
        .orchestrator
        .answer_turn(&mut transcript, &body.question, &opts)
        .await?;

    Ok(Json(AskResponse {
        answer: outcome.answer,
        sources: outcome.sources,
    }))
}
