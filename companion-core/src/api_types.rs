//! Public types re-used by external crates (e.g., the HTTP API layer).

use serde::Serialize;

/// One retrieved context chunk: indexed text plus its source document path.
///
/// Produced fresh per retrieval call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedChunk {
    /// Chunk text as stored in the search index.
    pub text: String,
    /// Source identifier (a relative document path on the platform stage).
    pub source_id: String,
}

/// Options that control a single turn.
///
/// Setting `top_k` to `0` means: "use the configured value". `model`
/// must name an entry of the configured allow-list when present.
#[derive(Debug, Clone, Default)]
pub struct TurnOptions {
    /// Number of chunks fetched as context. `0` falls back to config.
    pub top_k: u32,
    /// Optional model identifier override.
    pub model: Option<String>,
}

/// Final answer together with its source attribution.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Model answer, quote-sanitized, ready for display.
    pub answer: String,
    /// Source identifiers of the retrieved chunks, deduplicated in
    /// first-seen order.
    pub sources: Vec<String>,
}
