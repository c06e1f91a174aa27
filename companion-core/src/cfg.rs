//! Pipeline knobs, fixed for the lifetime of an orchestrator.

/// Which query string the retrieval stage uses when a history summary
/// exists. With no summary (stateless mode, or an empty window), the raw
/// question is always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetrievalQuerySource {
    /// Retrieve on the summarizer's rewritten query.
    #[default]
    Rewritten,
    /// Always retrieve on the raw user question.
    Raw,
}

/// Static configuration consumed by the orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model identifiers callers may select. The first entry is the
    /// default; must not be empty.
    pub models: Vec<String>,
    /// Chunks fetched as context per retrieval.
    pub top_k: u32,
    /// Sliding window of prior turns fed to the summarizer.
    pub window: usize,
    /// Query-source policy for the retrieval stage.
    pub retrieval_query: RetrievalQuerySource,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            models: vec!["mistral-large2".to_string()],
            top_k: 10,
            window: 7,
            retrieval_query: RetrievalQuerySource::default(),
        }
    }
}
