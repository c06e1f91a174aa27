//! Reachability probe for the managed platform endpoint.
//!
//! The returned [`HealthStatus`] is JSON-serializable and suitable for a
//! `/health` endpoint. [`HealthService::check`] is resilient and never
//! fails: any HTTP response at all counts as reachable (the platform
//! rejects unauthenticated probes with 4xx, which still proves the host is
//! up), while transport errors map to `ok = false`.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::error_handler::CortexError;

/// A serializable health snapshot for one endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Overall reachability flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

/// Health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns [`CortexError::HttpTransport`] if the HTTP client cannot be
    /// built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, CortexError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Probes the endpoint once and reports the outcome.
    ///
    /// Never returns an error; failures become `HealthStatus { ok: false }`.
    pub async fn check(&self, endpoint: &str) -> HealthStatus {
        let trimmed = endpoint.trim();
        if trimmed.is_empty()
            || !(trimmed.starts_with("http://") || trimmed.starts_with("https://"))
        {
            warn!(endpoint, "invalid endpoint for health probe");
            return HealthStatus {
                endpoint: trimmed.to_string(),
                ok: false,
                latency_ms: 0,
                message: "endpoint is empty or missing http/https".into(),
            };
        }

        let start = Instant::now();
        match self.client.get(trimmed).send().await {
            Ok(resp) => {
                let status = HealthStatus {
                    endpoint: trimmed.to_string(),
                    ok: true,
                    latency_ms: start.elapsed().as_millis(),
                    message: format!("HTTP {}", resp.status()),
                };
                info!(
                    endpoint = %status.endpoint,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(e) => {
                warn!(endpoint, error = %e, "health probe failed");
                HealthStatus {
                    endpoint: trimmed.to_string(),
                    ok: false,
                    latency_ms: start.elapsed().as_millis(),
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_endpoint_is_unhealthy_without_io() {
        let svc = HealthService::new(Some(1)).unwrap();
        let status = svc.check("not-a-url").await;
        assert!(!status.ok);
        assert_eq!(status.latency_ms, 0);
    }
}
