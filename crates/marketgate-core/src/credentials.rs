//! Per-caller credential resolution and the shared session key store.
//!
//! The store is the only piece of mutable cross-request state in the
//! dispatch core. Credential values are never logged, echoed into error
//! payloads, or exposed through `Debug` output.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Query-parameter names accepted as an explicit caller credential, in
/// precedence order. Outbound requests always carry [`CREDENTIAL_PARAM`]
/// regardless of which alias the caller used.
pub const CREDENTIAL_ALIASES: [&str; 3] = ["apikey", "api_key", "token"];

/// Canonical credential parameter name on the wire.
pub const CREDENTIAL_PARAM: &str = "apikey";

/// Errors from session credential registration operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("session id must not be empty")]
    NoSession,
    #[error("credential value must not be empty")]
    EmptyValue,
}

/// Eviction policy for session entries.
///
/// `Sliding` refreshes an entry's deadline on every successful lookup, so
/// only sessions idle for the full window are evicted. The policy is chosen
/// at construction; there is no hidden default expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTtl {
    Unbounded,
    Sliding(Duration),
}

struct SessionEntry {
    value: String,
    deadline: Option<Instant>,
}

struct StoreInner {
    entries: HashMap<String, SessionEntry>,
    ttl: SessionTtl,
}

impl StoreInner {
    fn deadline(&self) -> Option<Instant> {
        match self.ttl {
            SessionTtl::Unbounded => None,
            SessionTtl::Sliding(window) => Some(Instant::now() + window),
        }
    }
}

/// Thread-safe mapping from session identity to upstream credential.
///
/// Writes for a given session are atomic; a lookup racing a registration
/// for the same session observes either the old or the new value.
#[derive(Clone)]
pub struct SessionKeyStore {
    inner: Arc<tokio::sync::RwLock<StoreInner>>,
}

impl SessionKeyStore {
    pub fn new(ttl: SessionTtl) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(StoreInner {
                entries: HashMap::new(),
                ttl,
            })),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(SessionTtl::Unbounded)
    }

    /// Binds a credential to a session, overwriting any prior value.
    pub async fn register(
        &self,
        session: &str,
        value: impl Into<String>,
    ) -> Result<(), RegistrationError> {
        if session.trim().is_empty() {
            return Err(RegistrationError::NoSession);
        }
        let value = value.into();
        if value.trim().is_empty() {
            return Err(RegistrationError::EmptyValue);
        }

        let mut inner = self.inner.write().await;
        let deadline = inner.deadline();
        inner
            .entries
            .insert(session.to_owned(), SessionEntry { value, deadline });
        Ok(())
    }

    /// Removes the credential bound to a session. Returns whether a live
    /// entry existed.
    pub async fn clear(&self, session: &str) -> Result<bool, RegistrationError> {
        if session.trim().is_empty() {
            return Err(RegistrationError::NoSession);
        }

        let mut inner = self.inner.write().await;
        Ok(inner.entries.remove(session).is_some())
    }

    /// Looks up the credential for a session, refreshing its deadline under
    /// a sliding policy. Expired entries read as absent.
    pub async fn lookup(&self, session: &str) -> Option<String> {
        let mut inner = self.inner.write().await;
        let refreshed = inner.deadline();
        let now = Instant::now();

        let expired = inner
            .entries
            .get(session)?
            .deadline
            .is_some_and(|deadline| now > deadline);
        if expired {
            inner.entries.remove(session);
            return None;
        }

        let entry = inner.entries.get_mut(session)?;
        entry.deadline = refreshed;
        Some(entry.value.clone())
    }

    /// Sweeps entries whose deadline has passed.
    pub async fn evict_expired(&self) {
        let now = Instant::now();
        let mut inner = self.inner.write().await;
        inner
            .entries
            .retain(|_, entry| entry.deadline.is_none_or(|deadline| deadline >= now));
    }

    /// Number of entries, live or expired-but-unswept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl fmt::Debug for SessionKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeyStore").finish_non_exhaustive()
    }
}

/// Decides which upstream credential a call uses.
///
/// Priority: an explicit alias among the call's query parameters, then the
/// caller's session entry, then the process fallback. In multi-tenant mode
/// the fallback is reserved for the dispatcher's own probe calls and never
/// substituted into a caller-attributed dispatch.
pub struct CredentialResolver {
    sessions: SessionKeyStore,
    fallback: Option<String>,
    multi_tenant: bool,
}

impl CredentialResolver {
    pub fn new(sessions: SessionKeyStore, fallback: Option<String>, multi_tenant: bool) -> Self {
        Self {
            sessions,
            fallback,
            multi_tenant,
        }
    }

    pub fn sessions(&self) -> &SessionKeyStore {
        &self.sessions
    }

    /// Resolves the credential for a caller-initiated call.
    ///
    /// Strips every recognized alias from `params` so the executor controls
    /// the single canonical credential parameter on the wire.
    pub async fn resolve(
        &self,
        params: &mut BTreeMap<String, String>,
        session: Option<&str>,
    ) -> Option<String> {
        if let Some(explicit) = extract_explicit(params) {
            return Some(explicit);
        }

        if let Some(session) = session {
            if let Some(stored) = self.sessions.lookup(session).await {
                return Some(stored);
            }
        }

        if self.multi_tenant {
            return None;
        }
        self.fallback.clone()
    }

    /// Credential for the dispatcher's own health-check probes. Always the
    /// process fallback, even in multi-tenant mode.
    pub fn probe_credential(&self) -> Option<String> {
        self.fallback.clone()
    }
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("multi_tenant", &self.multi_tenant)
            .field("has_fallback", &self.fallback.is_some())
            .finish_non_exhaustive()
    }
}

fn extract_explicit(params: &mut BTreeMap<String, String>) -> Option<String> {
    let mut found = None;
    for alias in CREDENTIAL_ALIASES {
        if let Some(value) = params.remove(alias) {
            if found.is_none() && !value.trim().is_empty() {
                found = Some(value);
            }
        }
    }
    found
}
