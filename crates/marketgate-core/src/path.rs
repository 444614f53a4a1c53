use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Upstream API namespace selector.
///
/// The provider exposes its endpoints under a handful of path prefixes: the
/// current `stable` namespace, two frozen versioned namespaces, and the bare
/// host root for odd endpoints that live outside any prefix. `Legacy` is an
/// accepted alias for the v3 namespace kept for callers migrated from older
/// deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiVersion {
    Stable,
    V3,
    V4,
    Legacy,
    Raw,
}

impl ApiVersion {
    /// Parses a version tag, ASCII case-insensitively.
    ///
    /// Unrecognized tags resolve to `Stable`. Failing open keeps a request
    /// with a typoed tag routable instead of dead on arrival; the upstream
    /// 404 is still surfaced if the endpoint does not exist there.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "stable" => Self::Stable,
            "v3" => Self::V3,
            "v4" => Self::V4,
            "api" | "legacy" => Self::Legacy,
            "raw" => Self::Raw,
            _ => Self::Stable,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::V3 => "v3",
            Self::V4 => "v4",
            Self::Legacy => "legacy",
            Self::Raw => "raw",
        }
    }

    /// Path prefix the tag selects, without a trailing slash.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Stable => "/stable",
            Self::V3 | Self::Legacy => "/api/v3",
            Self::V4 => "/api/v4",
            Self::Raw => "",
        }
    }
}

impl Display for ApiVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a version tag and endpoint identifier to a concrete request path.
///
/// Endpoint identifiers that are already absolute URLs or absolute paths are
/// returned unchanged, which is what makes raw passthrough calls work. Total:
/// every input produces a path.
pub fn resolve_path(version: ApiVersion, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_owned();
    }
    if endpoint.starts_with('/') {
        return endpoint.to_owned();
    }
    format!("{}/{endpoint}", version.prefix())
}
