//! Managed search service client.
//!
//! Thin REST wrapper around the platform's query endpoint:
//! `POST {account}/api/v2/databases/{db}/schemas/{schema}/cortex-search-services/{name}:query`
//!
//! Constructor validation:
//! - `cfg.account_url` must start with http:// or https://
//! - `cfg.token` must be present
//!
//! The response is a JSON document with a `results` array, one object per
//! hit carrying the requested columns. A missing or malformed `results`
//! field is a decode error, never an empty hit list.

use std::time::Duration;

use reqwest::{StatusCode, header};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::search_service_config::SearchServiceConfig;
use crate::error_handler::CortexError;

/// Errors produced by [`SearchService`].
#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid endpoint (empty or missing http/https).
    #[error("[Cortex Client] invalid search endpoint: {0}")]
    InvalidEndpoint(String),

    /// No auth token configured for the service.
    #[error("[Cortex Client] missing auth token for search service")]
    MissingToken,

    /// Transport/HTTP client error.
    #[error("[Cortex Client] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-successful HTTP status from upstream.
    #[error("[Cortex Client] unexpected HTTP status {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body.
        snippet: String,
    },

    /// Unexpected/invalid JSON response.
    #[error("[Cortex Client] failed to decode search response: {0}")]
    Decode(String),
}

/// Thin client for one search service.
///
/// Initialized with a full [`SearchServiceConfig`]. Reuses an HTTP client
/// with bearer auth default headers and a configurable timeout.
pub struct SearchService {
    client: reqwest::Client,
    cfg: SearchServiceConfig,
    url_query: String,
}

impl SearchService {
    /// Creates a new [`SearchService`] from the given config.
    ///
    /// # Errors
    /// - [`SearchError::InvalidEndpoint`] if `cfg.account_url` is invalid
    /// - [`SearchError::MissingToken`] if no token is configured
    /// - [`SearchError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: SearchServiceConfig) -> Result<Self, CortexError> {
        let endpoint = cfg.account_url.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(SearchError::InvalidEndpoint(cfg.account_url.clone()).into());
        }

        let token = cfg.token.clone().ok_or(SearchError::MissingToken)?;

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| SearchError::Decode(format!("invalid auth token header: {e}")))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(SearchError::Transport)?;

        let base = endpoint.trim_end_matches('/');
        let url_query = format!(
            "{}/api/v2/databases/{}/schemas/{}/cortex-search-services/{}:query",
            base, cfg.database, cfg.schema, cfg.service
        );

        info!(
            service = %cfg.service,
            database = %cfg.database,
            schema = %cfg.schema,
            timeout_secs = timeout.as_secs(),
            "SearchService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_query,
        })
    }

    /// Issues one similarity query and returns the raw result rows, in the
    /// service's relevance order, at most `limit` of them.
    ///
    /// Rows keep the requested columns as JSON fields; callers map them to
    /// their own record types.
    ///
    /// # Errors
    /// - [`SearchError::HttpStatus`] for non-2xx responses
    /// - [`SearchError::Transport`] for client errors (timeouts included)
    /// - [`SearchError::Decode`] if the response lacks a `results` array
    #[instrument(skip_all, fields(service = %self.cfg.service))]
    pub async fn query(&self, query: &str, limit: u32) -> Result<Vec<Value>, SearchError> {
        let body = QueryRequest {
            query,
            columns: &self.cfg.columns,
            limit,
        };

        debug!(limit, "POST {}", self.url_query);
        let resp = self.client.post(&self.url_query).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_query.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = text.chars().take(240).collect::<String>();
            return Err(SearchError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        let raw = resp.text().await?;
        decode_results(&raw)
    }
}

/// Pulls the `results` array out of a query response document.
fn decode_results(raw: &str) -> Result<Vec<Value>, SearchError> {
    let doc: Value = serde_json::from_str(raw)
        .map_err(|e| SearchError::Decode(format!("serde error: {e}")))?;
    match doc.get("results") {
        Some(Value::Array(rows)) => Ok(rows.clone()),
        Some(_) => Err(SearchError::Decode("`results` is not an array".into())),
        None => Err(SearchError::Decode("response has no `results` field".into())),
    }
}

/// Request body for the `:query` endpoint.
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    columns: &'a [String],
    limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rows_in_order() {
        let raw = r#"{"results":[{"chunk":"a","relative_path":"p1"},{"chunk":"b","relative_path":"p2"}],"request_id":"x"}"#;
        let rows = decode_results(raw).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["chunk"], "a");
        assert_eq!(rows[1]["relative_path"], "p2");
    }

    #[test]
    fn decode_missing_results_is_error() {
        let err = decode_results(r#"{"request_id":"x"}"#).unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }

    #[test]
    fn decode_non_array_results_is_error() {
        let err = decode_results(r#"{"results":"nope"}"#).unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }

    #[test]
    fn decode_invalid_json_is_error() {
        let err = decode_results("{not json").unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }

    #[test]
    fn request_body_shape() {
        let columns = vec!["chunk".to_string(), "relative_path".to_string()];
        let body = QueryRequest {
            query: "minimum balance",
            columns: &columns,
            limit: 10,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["query"], "minimum balance");
        assert_eq!(v["limit"], 10);
        assert_eq!(v["columns"][1], "relative_path");
    }

    #[test]
    fn rejects_bad_endpoint() {
        let cfg = SearchServiceConfig {
            account_url: "ftp://nope".into(),
            token: Some("t".into()),
            database: "DB".into(),
            schema: "S".into(),
            service: "SVC".into(),
            columns: vec!["chunk".into()],
            timeout_secs: None,
        };
        assert!(SearchService::new(cfg).is_err());
    }

    #[test]
    fn rejects_missing_token() {
        let cfg = SearchServiceConfig {
            account_url: "https://acct.example.com".into(),
            token: None,
            database: "DB".into(),
            schema: "S".into(),
            service: "SVC".into(),
            columns: vec!["chunk".into()],
            timeout_secs: None,
        };
        assert!(SearchService::new(cfg).is_err());
    }
}
