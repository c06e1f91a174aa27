//! Typed error for the pipeline crate.
//!
//! Each runtime variant is terminal for the current turn: no retry, no
//! fallback answer, no caching of partial results.

use cortex_client::{ConfigError, CortexError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The search collaborator was unreachable or returned a malformed
    /// document.
    #[error("retrieval failed: {0}")]
    Retrieval(#[source] CortexError),

    /// The history-summarization completion call failed.
    #[error("history summarization failed: {0}")]
    Summarization(#[source] CortexError),

    /// The answer completion call failed.
    #[error("completion failed: {0}")]
    Completion(#[source] CortexError),

    /// Invalid static configuration (e.g., a model outside the allow-list);
    /// raised before any collaborator call.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
