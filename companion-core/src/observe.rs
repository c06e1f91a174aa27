//! Stage observers: evaluation hooks invoked after each pipeline stage.
//!
//! The orchestrator calls an observer with every stage's input and output,
//! so an external evaluation collaborator (groundedness, relevance scoring
//! and the like) can subscribe without the pipeline depending on any
//! scoring library.

use tracing::debug;

use crate::api_types::RetrievedChunk;
use crate::transcript::Turn;

/// Callback interface for per-stage instrumentation.
///
/// All methods default to no-ops so observers implement only what they
/// score.
pub trait StageObserver: Send + Sync {
    /// After history summarization: the window it read, the raw question,
    /// and the rewritten query.
    fn on_summary(&self, _history: &[Turn], _question: &str, _summary: &str) {}
    /// After retrieval: the query actually sent and the chunks returned.
    fn on_retrieval(&self, _query: &str, _chunks: &[RetrievedChunk]) {}
    /// After completion: the assembled prompt and the sanitized answer.
    fn on_completion(&self, _prompt: &str, _answer: &str) {}
}

/// Default observer for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;
impl StageObserver for NoopObserver {}

/// Logs stage inputs/outputs at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn on_summary(&self, history: &[Turn], question: &str, summary: &str) {
        debug!(turns = history.len(), question, summary, "summary stage");
    }

    fn on_retrieval(&self, query: &str, chunks: &[RetrievedChunk]) {
        debug!(query, hits = chunks.len(), "retrieval stage");
    }

    fn on_completion(&self, prompt: &str, answer: &str) {
        debug!(
            prompt_chars = prompt.len(),
            answer_chars = answer.len(),
            "completion stage"
        );
    }
}
