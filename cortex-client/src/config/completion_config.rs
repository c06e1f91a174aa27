//! Configuration for the hosted completion (LLM inference) service.

/// Connection and generation parameters for the completion endpoint.
///
/// The `model` field is the default model identifier; individual calls may
/// select a different one from the caller's allow-list.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Account base URL, shared with the search service.
    pub account_url: String,

    /// Bearer token used for every request.
    pub token: Option<String>,

    /// Default model identifier (e.g., `mistral-large2`).
    pub model: String,

    /// Maximum number of tokens to generate, when bounded.
    pub max_tokens: Option<u32>,

    /// Sampling temperature; `None` leaves the service default.
    pub temperature: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
