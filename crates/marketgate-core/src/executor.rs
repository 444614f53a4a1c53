//! Single-call execution with bounded retry.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::http_client::{HttpClient, HttpMethod, HttpRequest};
use crate::retry::RetryConfig;

/// The last failure observed for a logical call, after retries.
///
/// Earlier transient failures are absorbed by the retry loop and never
/// reported individually.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Upstream answered with a non-2xx status.
    Status { status: u16, body: String },
    /// No HTTP status was obtained at all.
    Transport { message: String },
    /// Upstream answered 2xx but the body was not valid JSON.
    Decode { status: u16, message: String },
}

/// Performs one logical HTTP call against the upstream provider.
///
/// Transient failures (429, 5xx, timeouts, connection errors) are retried
/// with exponential backoff up to the configured bound; everything else
/// propagates after a single attempt. The caller must have placed the
/// resolved credential in `params` before execution; the executor issues
/// no credential-less calls on behalf of the facade.
pub struct RequestExecutor {
    client: Arc<dyn HttpClient>,
    retry: RetryConfig,
    base_url: String,
}

impl RequestExecutor {
    pub fn new(client: Arc<dyn HttpClient>, retry: RetryConfig, base_url: impl Into<String>) -> Self {
        Self {
            client,
            retry,
            base_url: base_url.into(),
        }
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// One logical call under the configured retry policy.
    pub async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Value, AttemptFailure> {
        self.execute_with(method, path, params, self.retry.max_retries)
            .await
    }

    /// One attempt, no retries. Used by access probes.
    pub async fn execute_once(
        &self,
        method: HttpMethod,
        path: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Value, AttemptFailure> {
        self.execute_with(method, path, params, 0).await
    }

    async fn execute_with(
        &self,
        method: HttpMethod,
        path: &str,
        params: &BTreeMap<String, String>,
        max_retries: u32,
    ) -> Result<Value, AttemptFailure> {
        let url = self.request_url(path, params);
        let timeout_ms = self.retry.attempt_timeout.as_millis() as u64;
        let mut retries = 0u32;

        loop {
            // The query string carries the credential; log the path only.
            debug!(path, attempt = retries + 1, "upstream request");

            let request = HttpRequest::new(method, url.clone()).with_timeout_ms(timeout_ms);
            match self.client.execute(request).await {
                Ok(response) if response.is_success() => {
                    return serde_json::from_str(&response.body).map_err(|error| {
                        AttemptFailure::Decode {
                            status: response.status,
                            message: error.to_string(),
                        }
                    });
                }
                Ok(response) => {
                    if RetryConfig::is_transient_status(response.status) && retries < max_retries {
                        let delay = self.retry.delay_for_retry(retries);
                        warn!(
                            path,
                            status = response.status,
                            delay_ms = delay.as_millis() as u64,
                            "transient upstream failure, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        retries += 1;
                        continue;
                    }
                    return Err(AttemptFailure::Status {
                        status: response.status,
                        body: response.body,
                    });
                }
                Err(error) => {
                    if error.retryable() && retries < max_retries {
                        let delay = self.retry.delay_for_retry(retries);
                        warn!(
                            path,
                            delay_ms = delay.as_millis() as u64,
                            "transport failure, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        retries += 1;
                        continue;
                    }
                    return Err(AttemptFailure::Transport {
                        message: error.message().to_owned(),
                    });
                }
            }
        }
    }

    fn request_url(&self, path: &str, params: &BTreeMap<String, String>) -> String {
        let mut url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_owned()
        } else {
            format!("{}{path}", self.base_url)
        };

        let mut separator = if url.contains('?') { '&' } else { '?' };
        for (key, value) in params {
            let _ = write!(
                url,
                "{separator}{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            );
            separator = '&';
        }
        url
    }
}
