//! HTTP layer for the companion backend.
//!
//! Routes:
//! - `POST /ask`     — answer one conversational turn
//! - `POST /reset`   — clear a session's transcript, reseed the greeting
//! - `GET  /history` — full display transcript for a session
//! - `GET  /health`  — reachability of the managed platform endpoint

use std::{env, sync::Arc};

mod core;
pub mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;

use crate::core::app_state::AppState;
use crate::error_handler::AppError;
use crate::routes::{
    ask::ask_question_route::ask_question, health::health_route::health_check,
    history::history_route::conversation_history, reset::reset_route::reset_conversation,
};

pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".into());

    // Validate all static configuration up front; no pipeline call is
    // attempted if anything is missing or malformed.
    let state = Arc::new(AppState::from_env()?);

    let app = Router::new()
        .route("/ask", post(ask_question))
        .route("/reset", post(reset_conversation))
        .route("/history", get(conversation_history))
        .route("/health", get(health_check))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    tracing::info!(%host_url, "companion api listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}
