//! Unified error handling for `cortex-client`.
//!
//! This module exposes a single top-level error type [`CortexError`] for the
//! whole library and groups domain-specific errors in nested enums. The two
//! service clients keep their own call-level enums ([`SearchError`],
//! [`CompleteError`]) next to the code that produces them; constructors and
//! config loading funnel everything through the unified [`Result<T>`] alias.
//!
//! All messages include the prefix `[Cortex Client]` to simplify attribution
//! in logs.
//!
//! [`SearchError`]: crate::services::search_service::SearchError
//! [`CompleteError`]: crate::services::completion_service::CompleteError

use thiserror::Error;

use crate::services::completion_service::CompleteError;
use crate::services::search_service::SearchError;

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, CortexError>;

/// Top-level error for the `cortex-client` crate.
///
/// Variants wrap the domain-specific enums. Prefer adding a new sub-enum for
/// a distinct domain instead of growing this type indefinitely.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CortexError {
    /// Configuration/validation errors (startup only).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Search service failures (transport, HTTP status, malformed results).
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Completion service failures (transport, quota, empty response).
    #[error(transparent)]
    Complete(#[from] CompleteError),

    /// Underlying HTTP transport error outside a specific service call.
    #[error("[Cortex Client] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),
}

/// Error enum for environment/config-driven setup.
///
/// Keep this focused: only errors that realistically happen at config
/// load/validation time. Every variant here is raised before the first
/// collaborator call is attempted.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[Cortex Client] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (ports, limits, timeouts).
    #[error("[Cortex Client] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `RETRIEVAL_TOP_K`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL or enum keyword).
    #[error("[Cortex Client] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `CORTEX_ACCOUNT_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// Model name was empty or the allow-list resolved to nothing.
    #[error("[Cortex Client] model name must not be empty")]
    EmptyModel,

    /// Caller asked for a model outside the configured allow-list.
    #[error("[Cortex Client] unsupported model: {0}")]
    UnsupportedModel(String),
}

/// Fetches a required, non-empty environment variable.
///
/// # Errors
/// Returns [`CortexError::Config`] with [`ConfigError::MissingVar`] if the
/// variable is absent or empty.
pub fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Fetches an environment variable with a fallback default.
pub fn env_or(name: &str, dflt: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| dflt.to_string())
}

/// Parses an optional `u32` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`CortexError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `u32`.
pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse::<u32>().map(Some).map_err(|_| {
            CortexError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        _ => Ok(None),
    }
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`CortexError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `u64`.
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse::<u64>().map(Some).map_err(|_| {
            CortexError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        _ => Ok(None),
    }
}

/// Parses an optional `usize` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`CortexError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `usize`.
pub fn env_opt_usize(name: &'static str) -> Result<Option<usize>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse::<usize>().map(Some).map_err(|_| {
            CortexError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected usize",
            })
        }),
        _ => Ok(None),
    }
}
