//! Scripted transport and dispatcher fixtures shared by the behavior tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use marketgate_core::{
    Dispatcher, DispatcherBuilder, HttpClient, HttpError, HttpRequest, HttpResponse, RetryConfig,
};

/// Transport that answers from a fixed script and records every request.
///
/// Once the script is exhausted it fails non-retryably, so a test that
/// under-provisions responses fails loudly instead of hanging in a retry
/// loop.
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new(script: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Script of 2xx JSON bodies.
    pub fn ok_json(bodies: &[&str]) -> Arc<Self> {
        Self::new(
            bodies
                .iter()
                .map(|body| Ok(HttpResponse::ok_json(*body)))
                .collect(),
        )
    }

    /// Script repeating one status/body pair `count` times.
    pub fn repeated_status(status: u16, body: &str, count: usize) -> Arc<Self> {
        Self::new(
            std::iter::repeat_with(|| Ok(HttpResponse::with_status(status, body)))
                .take(count)
                .collect(),
        )
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .len()
    }

    pub fn recorded_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .push(request);
        let response = self
            .responses
            .lock()
            .expect("response script should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::non_retryable("response script exhausted")));
        Box::pin(async move { response })
    }
}

/// Dispatcher wired to a scripted transport with millisecond backoff.
pub fn dispatcher_with(client: Arc<ScriptedHttpClient>) -> Dispatcher {
    DispatcherBuilder::new()
        .with_http_client(client)
        .with_retry(RetryConfig::fixed(Duration::from_millis(1), 3))
        .build()
}

/// Same, but single-attempt: classification tests need no retry noise.
pub fn dispatcher_no_retry(client: Arc<ScriptedHttpClient>) -> Dispatcher {
    DispatcherBuilder::new()
        .with_http_client(client)
        .with_retry(RetryConfig::fixed(Duration::from_millis(1), 0))
        .build()
}
