use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use companion_core::PipelineError;
use cortex_client::CortexError;
use thiserror::Error;

use crate::core::http::response_envelope::ApiResponse;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    /// Startup configuration failed validation; the server never begins
    /// serving.
    #[error(transparent)]
    Startup(#[from] CortexError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A pipeline stage failed for the current turn.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // startup-only; surfaces before the router exists
            AppError::Startup(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,

            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,

            // a bad per-request option (unknown model) is the caller's fault
            AppError::Pipeline(PipelineError::Config(_)) => StatusCode::BAD_REQUEST,
            // upstream collaborator failures
            AppError::Pipeline(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Startup(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Pipeline(PipelineError::Retrieval(_)) => "RETRIEVAL_ERROR",
            AppError::Pipeline(PipelineError::Summarization(_)) => "SUMMARIZATION_ERROR",
            AppError::Pipeline(PipelineError::Completion(_)) => "COMPLETION_ERROR",
            AppError::Pipeline(PipelineError::Config(_)) => "CONFIG_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::<()>::error(self.error_code(), self.to_string())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
