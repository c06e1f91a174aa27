//! Thin REST clients for the managed data platform behind the companion
//! backend: the search service (similarity queries over indexed document
//! chunks) and the completion service (hosted LLM inference), plus unified
//! error handling, a reachability probe, and a library-scoped tracing layer.
//!
//! Nothing in this crate retries or caches; callers decide what a failed
//! call means for their turn.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod services;
pub mod telemetry;

pub use config::completion_config::CompletionConfig;
pub use config::search_service_config::SearchServiceConfig;
pub use error_handler::{ConfigError, CortexError};
pub use health_service::{HealthService, HealthStatus};
pub use services::completion_service::{CompleteError, CompletionService};
pub use services::search_service::{SearchError, SearchService};
