//! # Marketgate Core
//!
//! Dispatch core for a read-only financial data gateway: a large set of
//! declaratively-described upstream REST endpoints exposed as uniformly
//! shaped callable actions behind a multi-tenant credential model.
//!
//! This crate contains:
//! - Version-tag path resolution with raw passthrough
//! - Per-caller credential resolution and the shared session key store
//! - HTTP execution with bounded retry and jittered exponential backoff
//! - Cursor-style pagination accumulation
//! - Structured classification of upstream failures
//! - The dispatch facade combining all of the above
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`catalog`] | Static endpoint catalog and plan hints |
//! | [`classify`] | Error kinds and failure classification |
//! | [`credentials`] | Credential resolution and session store |
//! | [`dispatch`] | Dispatch facade and builder |
//! | [`executor`] | Retrying request executor |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`pagination`] | Page accumulation |
//! | [`path`] | Version tags and path resolution |
//! | [`retry`] | Backoff and retry policy |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use marketgate_core::{ApiVersion, CallRequest, Dispatcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = Dispatcher::builder()
//!         .with_fallback_credential(std::env::var("FMP_API_KEY").unwrap())
//!         .build();
//!
//!     let request = CallRequest::get(ApiVersion::Stable, "quote").with_symbol("AAPL");
//!     match dispatcher.dispatch(request).await {
//!         Ok(payload) => println!("{payload}"),
//!         Err(error) => eprintln!("{error}"),
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! Credentials travel only as the canonical `apikey` query parameter on
//! outbound requests. They are never logged, never echoed into error
//! payloads, and never visible through `Debug` output of the store.

pub mod catalog;
pub mod classify;
pub mod credentials;
pub mod dispatch;
pub mod executor;
pub mod http_client;
pub mod pagination;
pub mod path;
pub mod retry;

pub use catalog::{find as find_endpoint, EndpointDescriptor, PlanTier, CATALOG};
pub use classify::{classify_status, ClassifiedError, ErrorKind};
pub use credentials::{
    CredentialResolver, RegistrationError, SessionKeyStore, SessionTtl, CREDENTIAL_ALIASES,
    CREDENTIAL_PARAM,
};
pub use dispatch::{
    CallRequest, Dispatcher, DispatcherBuilder, ProbeReport, DEFAULT_BASE_URL,
};
pub use executor::{AttemptFailure, RequestExecutor};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use pagination::{Pagination, PaginationError};
pub use path::{resolve_path, ApiVersion};
pub use retry::{Backoff, RetryConfig};
