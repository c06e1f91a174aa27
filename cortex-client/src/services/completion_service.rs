//! Hosted completion (LLM inference) client.
//!
//! Thin REST wrapper around the platform's inference endpoint:
//! `POST {account}/api/v2/cortex/inference:complete`
//!
//! One synchronous (non-streaming) request per call: a single user message
//! in, generated text out. Quota/rate-limit rejections (HTTP 429) get their
//! own error kind so callers can tell them apart from other upstream
//! failures; an empty generation is an error, never an empty string.

use std::time::Duration;

use reqwest::{StatusCode, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::completion_config::CompletionConfig;
use crate::error_handler::{ConfigError, CortexError};

/// Errors produced by [`CompletionService`].
#[derive(Debug, Error)]
pub enum CompleteError {
    /// Invalid endpoint (empty or missing http/https).
    #[error("[Cortex Client] invalid completion endpoint: {0}")]
    InvalidEndpoint(String),

    /// No auth token configured for the service.
    #[error("[Cortex Client] missing auth token for completion service")]
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

    /// The service rejected the request for quota or rate-limit reasons.
    #[error("[Cortex Client] quota or rate limit rejection from {url}")]
    Quota {
        /// Request URL.
        url: String,
    },

    /// Unexpected/invalid JSON response.
    #[error("[Cortex Client] failed to decode completion response: {0}")]
    Decode(String),

    /// The service answered but generated nothing.
    #[error("[Cortex Client] completion returned an empty response")]
    EmptyResponse,
}

/// Thin client for the completion endpoint.
///
/// Initialized with a full [`CompletionConfig`]. Reuses an HTTP client with
/// bearer auth default headers and a configurable timeout. The model is
/// selected per call; the config only carries the default identifier and
/// generation bounds.
pub struct CompletionService {
    client: reqwest::Client,
    cfg: CompletionConfig,
    url_complete: String,
}

impl CompletionService {
    /// Creates a new [`CompletionService`] from the given config.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyModel`] if the default model name is empty
    /// - [`CompleteError::InvalidEndpoint`] if `cfg.account_url` is invalid
    /// - [`CompleteError::MissingToken`] if no token is configured
    /// - [`CompleteError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: CompletionConfig) -> Result<Self, CortexError> {
        if cfg.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }

        let endpoint = cfg.account_url.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(CompleteError::InvalidEndpoint(cfg.account_url.clone()).into());
        }

        let token = cfg.token.clone().ok_or(CompleteError::MissingToken)?;

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| CompleteError::Decode(format!("invalid auth token header: {e}")))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(CompleteError::Transport)?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_complete = format!("{}/api/v2/cortex/inference:complete", base);

        info!(
            model = %cfg.model,
            timeout_secs = timeout.as_secs(),
            "CompletionService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_complete,
        })
    }

    /// Performs a **non-streaming** completion request.
    ///
    /// Mapped options:
    /// - `model`       ← argument
    /// - `messages`    ← single user message with `prompt`
    /// - `max_tokens`  ← `self.cfg.max_tokens`
    /// - `temperature` ← `self.cfg.temperature`
    ///
    /// # Errors
    /// - [`CompleteError::Quota`] on HTTP 429
    /// - [`CompleteError::HttpStatus`] for other non-2xx responses
    /// - [`CompleteError::Transport`] for client errors (timeouts included)
    /// - [`CompleteError::Decode`] if the response cannot be parsed
    /// - [`CompleteError::EmptyResponse`] if the generation is empty
    #[instrument(skip_all, fields(model = %model))]
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<String, CompleteError> {
        let body = CompleteRequest {
            model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.cfg.max_tokens,
            temperature: self.cfg.temperature,
        };

        debug!("POST {}", self.url_complete);
        let resp = self
            .client
            .post(&self.url_complete)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CompleteError::Quota {
                url: self.url_complete.clone(),
            });
        }
        if !status.is_success() {
            let url = self.url_complete.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = text.chars().take(240).collect::<String>();
            return Err(CompleteError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        let out: CompleteResponse = resp
            .json()
            .await
            .map_err(|e| CompleteError::Decode(format!("serde error: {e}")))?;

        extract_text(out)
    }
}

/// Pulls the generated text out of a decoded response.
fn extract_text(out: CompleteResponse) -> Result<String, CompleteError> {
    let text = out
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .map(|m| m.content)
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(CompleteError::EmptyResponse);
    }
    Ok(text)
}

/// Request body for the `inference:complete` endpoint.
#[derive(Debug, Serialize)]
struct CompleteRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body, minimal shape: the generated text lives in the first
/// choice's message.
#[derive(Debug, Deserialize)]
struct CompleteResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_choice() {
        let out: CompleteResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"There is no minimum."}},{"message":{"content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(out).unwrap(), "There is no minimum.");
    }

    #[test]
    fn empty_choices_is_empty_response() {
        let out: CompleteResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_text(out),
            Err(CompleteError::EmptyResponse)
        ));
    }

    #[test]
    fn blank_content_is_empty_response() {
        let out: CompleteResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  \n"}}]}"#).unwrap();
        assert!(matches!(
            extract_text(out),
            Err(CompleteError::EmptyResponse)
        ));
    }

    #[test]
    fn request_body_skips_unset_options() {
        let body = CompleteRequest {
            model: "mistral-large2",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
            max_tokens: None,
            temperature: None,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "mistral-large2");
        assert_eq!(v["messages"][0]["role"], "user");
        assert!(v.get("max_tokens").is_none());
        assert!(v.get("temperature").is_none());
    }

    #[test]
    fn rejects_empty_model() {
        let cfg = CompletionConfig {
            account_url: "https://acct.example.com".into(),
            token: Some("t".into()),
            model: "  ".into(),
            max_tokens: None,
            temperature: None,
            timeout_secs: None,
        };
        assert!(CompletionService::new(cfg).is_err());
    }
}
