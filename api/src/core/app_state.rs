//! Shared state for all HTTP handlers, validated once at startup.

use std::sync::Arc;

use companion_core::{
    ConversationMode, ConversationOrchestrator, CortexCompletion, CortexSearch, PipelineConfig,
    RetrievalQuerySource, TracingObserver,
};
use cortex_client::{
    CompletionConfig, CompletionService, ConfigError, CortexError, HealthService,
    SearchService, SearchServiceConfig,
    error_handler::{env_opt_u32, env_opt_u64, env_opt_usize, env_or, must_env},
};

use crate::core::session_store::SessionStore;
use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// The conversational pipeline, fixed for the process lifetime.
    pub orchestrator: ConversationOrchestrator<CortexSearch, CortexCompletion>,
    /// Per-session transcripts.
    pub sessions: SessionStore,
    /// Platform reachability probe for `/health`.
    pub health: HealthService,
    /// Account base URL, probed by `/health`.
    pub account_url: String,
}

impl AppState {
    /// Loads and validates all static configuration, then constructs the
    /// pipeline. Any missing or malformed value aborts startup here,
    /// before the first collaborator call.
    pub fn from_env() -> Result<Self, AppError> {
        let account_url = must_env("CORTEX_ACCOUNT_URL")?;
        let token = must_env("CORTEX_AUTH_TOKEN")?;
        let timeout_secs = env_opt_u64("CORTEX_TIMEOUT_SECS")?.or(Some(30));

        let database = env_or("CORTEX_SEARCH_DATABASE", "GX_COMPANION");
        let schema = env_or("CORTEX_SEARCH_SCHEMA", "DATA");
        let service = env_or("CORTEX_SEARCH_SERVICE", "GX_SEARCH_SERVICE");
        let text_column = env_or("CORTEX_SEARCH_TEXT_COLUMN", "chunk");
        let source_column = env_or("CORTEX_SEARCH_SOURCE_COLUMN", "relative_path");

        let models: Vec<String> = env_or("CORTEX_MODELS", "mistral-large2")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if models.is_empty() {
            return Err(CortexError::from(ConfigError::EmptyModel).into());
        }

        let top_k = env_opt_u32("RETRIEVAL_TOP_K")?.unwrap_or(10);
        let window = env_opt_usize("HISTORY_WINDOW")?.unwrap_or(7);

        let retrieval_query = match env_or("RETRIEVE_ON", "summary").as_str() {
            "summary" => RetrievalQuerySource::Rewritten,
            "question" => RetrievalQuerySource::Raw,
            _ => {
                return Err(CortexError::from(ConfigError::InvalidFormat {
                    var: "RETRIEVE_ON",
                    reason: "expected `summary` or `question`",
                })
                .into());
            }
        };
        let mode = match env_or("CHAT_MODE", "history").as_str() {
            "history" => ConversationMode::HistoryAware,
            "stateless" => ConversationMode::Stateless,
            _ => {
                return Err(CortexError::from(ConfigError::InvalidFormat {
                    var: "CHAT_MODE",
                    reason: "expected `history` or `stateless`",
                })
                .into());
            }
        };

        let search = SearchService::new(SearchServiceConfig {
            account_url: account_url.clone(),
            token: Some(token.clone()),
            database,
            schema,
            service,
            columns: vec![text_column.clone(), source_column.clone()],
            timeout_secs,
        })?;

        let chat = CompletionService::new(CompletionConfig {
            account_url: account_url.clone(),
            token: Some(token),
            model: models[0].clone(),
            max_tokens: env_opt_u32("COMPLETION_MAX_TOKENS")?,
            temperature: None,
            timeout_secs,
        })?;

        let cfg = PipelineConfig {
            models,
            top_k,
            window,
            retrieval_query,
        };
        let orchestrator = ConversationOrchestrator::new(
            CortexSearch::new(search, text_column, source_column),
            CortexCompletion::new(chat),
            cfg,
            mode,
        )
        .with_observer(Arc::new(TracingObserver));

        let health = HealthService::new(timeout_secs)?;

        Ok(Self {
            orchestrator,
            sessions: SessionStore::new(),
            health,
            account_url,
        })
    }
}
