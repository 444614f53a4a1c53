//! Structured classification of failed dispatch attempts.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::catalog::PlanTier;
use crate::executor::AttemptFailure;
use crate::path::ApiVersion;

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCredential,
    AuthInvalid,
    PaymentRequired,
    PlanOrPermission,
    RateLimit,
    NotFound,
    UpstreamError,
    ClientTransportError,
    Unknown,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::AuthInvalid => "auth_invalid",
            Self::PaymentRequired => "payment_required",
            Self::PlanOrPermission => "plan_or_permission",
            Self::RateLimit => "rate_limit",
            Self::NotFound => "not_found",
            Self::UpstreamError => "upstream_error",
            Self::ClientTransportError => "client_transport_error",
            Self::Unknown => "unknown",
        }
    }

    /// Mirrors the executor's transient-status set: only rate limits and
    /// upstream 5xx outcomes are worth retrying.
    pub const fn retryable(self) -> bool {
        matches!(self, Self::RateLimit | Self::UpstreamError)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body substrings that suggest a plan or permission ceiling rather than a
/// transient fault. Best-effort secondary signal: provider wording drifts,
/// the status table stays authoritative.
const PLAN_KEYWORDS: [&str; 6] = [
    "plan",
    "upgrade",
    "subscription",
    "permission",
    "quota",
    "exclusive",
];

/// Longest body excerpt carried into a classified message.
const MESSAGE_EXCERPT_LIMIT: usize = 500;

/// Fully-populated failure outcome returned across the facade boundary.
///
/// Never carries the credential, in any field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub message: String,
    pub retryable: bool,
    pub endpoint: String,
    pub version: ApiVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_hint: Option<PlanTier>,
}

impl ClassifiedError {
    /// Classifies the terminal failure of an executed call.
    pub fn from_failure(
        failure: AttemptFailure,
        endpoint: &str,
        version: ApiVersion,
        plan_hint: Option<PlanTier>,
    ) -> Self {
        match failure {
            AttemptFailure::Status { status, body } => {
                let kind = classify_status(status, &body);
                Self {
                    kind,
                    http_status: Some(status),
                    message: format!("upstream returned HTTP {status}: {}", excerpt(&body)),
                    retryable: kind.retryable(),
                    endpoint: endpoint.to_owned(),
                    version,
                    plan_hint,
                }
            }
            AttemptFailure::Transport { message } => Self {
                kind: ErrorKind::ClientTransportError,
                http_status: None,
                message: format!("transport failure: {}", excerpt(&message)),
                retryable: false,
                endpoint: endpoint.to_owned(),
                version,
                plan_hint,
            },
            AttemptFailure::Decode { status, message } => Self {
                kind: ErrorKind::Unknown,
                http_status: Some(status),
                message: format!("undecodable response body: {}", excerpt(&message)),
                retryable: false,
                endpoint: endpoint.to_owned(),
                version,
                plan_hint,
            },
        }
    }

    /// Short-circuit outcome when no credential could be resolved; no HTTP
    /// call was made.
    pub fn missing_credential(endpoint: &str, version: ApiVersion) -> Self {
        Self {
            kind: ErrorKind::MissingCredential,
            http_status: None,
            message: String::from(
                "no credential resolvable: supply an apikey parameter or register one for the session",
            ),
            retryable: false,
            endpoint: endpoint.to_owned(),
            version,
            plan_hint: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for ClassifiedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl std::error::Error for ClassifiedError {}

/// Maps an HTTP status and body to a failure kind.
///
/// The status table is authoritative. The keyword scan only promotes
/// ambiguous non-retryable statuses (401, 402, and unclassified 4xx) to
/// `PlanOrPermission`; it never reclassifies 404 and never demotes a
/// retryable outcome, so the executor's retry decisions stay coherent.
pub fn classify_status(status: u16, body: &str) -> ErrorKind {
    let kind = match status {
        401 => ErrorKind::AuthInvalid,
        402 => ErrorKind::PaymentRequired,
        403 => ErrorKind::PlanOrPermission,
        404 => ErrorKind::NotFound,
        429 => ErrorKind::RateLimit,
        status if status >= 500 => ErrorKind::UpstreamError,
        _ => ErrorKind::Unknown,
    };

    let upgradable = matches!(
        kind,
        ErrorKind::AuthInvalid | ErrorKind::PaymentRequired | ErrorKind::Unknown
    );
    if upgradable && mentions_plan_ceiling(body) {
        return ErrorKind::PlanOrPermission;
    }
    kind
}

fn mentions_plan_ceiling(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    PLAN_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Truncates on a char boundary at most `MESSAGE_EXCERPT_LIMIT` bytes in.
fn excerpt(text: &str) -> &str {
    if text.len() <= MESSAGE_EXCERPT_LIMIT {
        return text;
    }
    let mut cut = MESSAGE_EXCERPT_LIMIT;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    &text[..cut]
}
