//! Coordinates of the managed search service.

/// Everything needed to address one search service on the platform.
///
/// All fields are static configuration supplied at startup; nothing here is
/// derived at runtime.
#[derive(Debug, Clone)]
pub struct SearchServiceConfig {
    /// Account base URL, e.g. `https://myaccount.snowflakecomputing.com`.
    pub account_url: String,

    /// Bearer token used for every request.
    pub token: Option<String>,

    /// Database holding the search service.
    pub database: String,

    /// Schema holding the search service.
    pub schema: String,

    /// Name of the search service itself.
    pub service: String,

    /// Columns requested per hit (the text column and the source-path
    /// column, in that order by convention).
    pub columns: Vec<String>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
