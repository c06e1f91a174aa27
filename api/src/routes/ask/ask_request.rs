use serde::{Deserialize, Serialize};

/// Request payload for /ask.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question about the bank's products.
    pub question: String,
    /// Session the turn belongs to; one transcript per id.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Optional override: number of chunks retrieved as context.
    #[serde(default)]
    pub top_k: Option<u32>,
    /// Optional override: model identifier (must be in the allow-list).
    #[serde(default)]
    pub model: Option<String>,
}

/// Response payload for /ask.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// Final model answer (plain text).
    pub answer: String,
    /// Deduplicated source document paths behind the answer.
    pub sources: Vec<String>,
}
