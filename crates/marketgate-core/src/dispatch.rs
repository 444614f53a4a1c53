//! The dispatch facade: the single entry point for upstream calls.
//!
//! Every exit path is a value. Failures come back as a
//! [`ClassifiedError`]; no transport exception or status error crosses
//! this boundary.

use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::catalog::{self, EndpointDescriptor};
use crate::classify::{ClassifiedError, ErrorKind};
use crate::credentials::{
    CredentialResolver, RegistrationError, SessionKeyStore, SessionTtl, CREDENTIAL_PARAM,
};
use crate::executor::RequestExecutor;
use crate::http_client::{HttpClient, HttpMethod, NoopHttpClient, ReqwestHttpClient};
use crate::pagination::{accumulate, Pagination};
use crate::path::{resolve_path, ApiVersion};
use crate::retry::RetryConfig;

/// Upstream provider host.
pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com";

/// One dispatch invocation. Created fresh per call, never shared.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub version: ApiVersion,
    pub endpoint: String,
    pub method: HttpMethod,
    pub params: BTreeMap<String, String>,
    pub symbol: Option<String>,
    pub pagination: Option<Pagination>,
    pub session: Option<String>,
}

impl CallRequest {
    pub fn new(version: ApiVersion, endpoint: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            version,
            endpoint: endpoint.into(),
            method,
            params: BTreeMap::new(),
            symbol: None,
            pagination: None,
            session: None,
        }
    }

    pub fn get(version: ApiVersion, endpoint: impl Into<String>) -> Self {
        Self::new(version, endpoint, HttpMethod::Get)
    }

    /// Seeds a request from a catalog row, defaults applied. Parameters set
    /// afterwards override the defaults.
    pub fn from_descriptor(descriptor: &EndpointDescriptor) -> Self {
        let mut request = Self::get(descriptor.version, descriptor.path);
        for (key, value) in descriptor.defaults {
            request.params.insert((*key).to_owned(), (*value).to_owned());
        }
        request
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.params.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }
}

/// Outcome of a single-endpoint access probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub endpoint: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ClassifiedError>,
}

/// Builds a [`Dispatcher`] from explicit settings or the process
/// environment.
///
/// # Environment Variables
///
/// | Variable | Fallback | Meaning |
/// |----------|----------|---------|
/// | `MARKETGATE_FMP_API_KEY` | `FMP_API_KEY` | Process fallback credential |
/// | `MARKETGATE_MULTI_TENANT` | - | `1` reserves the fallback for probes |
pub struct DispatcherBuilder {
    base_url: String,
    retry: RetryConfig,
    session_ttl: SessionTtl,
    fallback: Option<String>,
    multi_tenant: bool,
    client: Option<Arc<dyn HttpClient>>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            retry: RetryConfig::default(),
            session_ttl: SessionTtl::Unbounded,
            fallback: None,
            multi_tenant: false,
            client: None,
        }
    }

    /// Reads the fallback credential and tenancy mode from the environment.
    pub fn from_env() -> Self {
        let fallback = env::var("MARKETGATE_FMP_API_KEY")
            .or_else(|_| env::var("FMP_API_KEY"))
            .ok()
            .filter(|value| !value.trim().is_empty());
        let multi_tenant = env::var("MARKETGATE_MULTI_TENANT").is_ok_and(|value| value == "1");

        Self {
            fallback,
            multi_tenant,
            ..Self::new()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_session_ttl(mut self, ttl: SessionTtl) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_fallback_credential(mut self, credential: impl Into<String>) -> Self {
        self.fallback = Some(credential.into());
        self
    }

    pub fn multi_tenant(mut self, multi_tenant: bool) -> Self {
        self.multi_tenant = multi_tenant;
        self
    }

    pub fn with_http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Offline transport answering every call with an empty collection.
    pub fn with_mock_transport(self) -> Self {
        self.with_http_client(Arc::new(NoopHttpClient))
    }

    pub fn build(self) -> Dispatcher {
        let client = self
            .client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        Dispatcher {
            executor: RequestExecutor::new(client, self.retry, self.base_url),
            credentials: CredentialResolver::new(
                SessionKeyStore::new(self.session_ttl),
                self.fallback,
                self.multi_tenant,
            ),
        }
    }
}

/// Combines path resolution, credential resolution, execution, pagination
/// and failure classification behind one `dispatch` call.
pub struct Dispatcher {
    executor: RequestExecutor,
    credentials: CredentialResolver,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Dispatches one call. Returns the decoded payload unchanged on
    /// success; classifies every failure.
    pub async fn dispatch(&self, request: CallRequest) -> Result<Value, ClassifiedError> {
        let CallRequest {
            version,
            endpoint,
            method,
            mut params,
            symbol,
            pagination,
            session,
        } = request;

        if let Some(symbol) = symbol {
            params.entry(String::from("symbol")).or_insert(symbol);
        }

        let Some(credential) = self.credentials.resolve(&mut params, session.as_deref()).await
        else {
            return Err(ClassifiedError::missing_credential(&endpoint, version));
        };
        params.insert(CREDENTIAL_PARAM.to_owned(), credential);

        let path = resolve_path(version, &endpoint);
        let plan_hint = catalog::plan_hint_for(version, &endpoint);

        let outcome = match &pagination {
            Some(pagination) => {
                accumulate(&self.executor, method, &path, &params, pagination).await
            }
            None => self.executor.execute(method, &path, &params).await,
        };

        outcome
            .map_err(|failure| ClassifiedError::from_failure(failure, &endpoint, version, plan_hint))
    }

    /// Generic invoke-by-name over the catalog: looks up the descriptor,
    /// merges its defaults under the caller's parameters, and dispatches.
    pub async fn invoke(
        &self,
        action: &str,
        overrides: BTreeMap<String, String>,
        session: Option<String>,
    ) -> Result<Value, ClassifiedError> {
        let Some(descriptor) = catalog::find(action) else {
            return Err(ClassifiedError {
                kind: ErrorKind::NotFound,
                http_status: None,
                message: format!("unknown catalog action '{action}'"),
                retryable: false,
                endpoint: action.to_owned(),
                version: ApiVersion::Stable,
                plan_hint: None,
            });
        };

        let mut request = CallRequest::from_descriptor(descriptor).with_params(overrides);
        request.session = session;
        self.dispatch(request).await
    }

    /// Binds a credential to a caller session.
    pub async fn register_credential(
        &self,
        session: &str,
        credential: impl Into<String>,
    ) -> Result<(), RegistrationError> {
        self.credentials.sessions().register(session, credential).await
    }

    /// Clears a caller session's credential. Returns whether one existed.
    pub async fn clear_credential(&self, session: &str) -> Result<bool, RegistrationError> {
        self.credentials.sessions().clear(session).await
    }

    /// Sweeps expired session entries.
    pub async fn evict_expired_sessions(&self) {
        self.credentials.sessions().evict_expired().await;
    }

    /// Single-attempt access check against one catalog row.
    ///
    /// Probes are self-attributed, so they may use the process fallback
    /// credential even in multi-tenant mode.
    pub async fn probe(&self, descriptor: &'static EndpointDescriptor) -> ProbeReport {
        let Some(credential) = self.credentials.probe_credential() else {
            return ProbeReport {
                endpoint: descriptor.name,
                ok: false,
                sample: None,
                error: Some(ClassifiedError::missing_credential(
                    descriptor.path,
                    descriptor.version,
                )),
            };
        };

        let mut params: BTreeMap<String, String> = descriptor
            .probe_params
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        params.insert(CREDENTIAL_PARAM.to_owned(), credential);

        let path = resolve_path(descriptor.version, descriptor.path);
        match self.executor.execute_once(HttpMethod::Get, &path, &params).await {
            Ok(value) => ProbeReport {
                endpoint: descriptor.name,
                ok: true,
                sample: Some(truncate_sample(value)),
                error: None,
            },
            Err(failure) => ProbeReport {
                endpoint: descriptor.name,
                ok: false,
                sample: None,
                error: Some(ClassifiedError::from_failure(
                    failure,
                    descriptor.path,
                    descriptor.version,
                    Some(descriptor.plan_hint),
                )),
            },
        }
    }

    /// Probes every catalog row in order.
    pub async fn probe_all(&self) -> Vec<ProbeReport> {
        let mut reports = Vec::with_capacity(catalog::CATALOG.len());
        for descriptor in catalog::CATALOG {
            reports.push(self.probe(descriptor).await);
        }
        reports
    }
}

/// Probe reporting keeps list samples to a glanceable size.
fn truncate_sample(value: Value) -> Value {
    match value {
        Value::Array(rows) if rows.len() > 3 => {
            Value::Array(rows.into_iter().take(3).collect())
        }
        other => other,
    }
}
