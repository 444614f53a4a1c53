//! Static endpoint catalog.
//!
//! Each upstream endpoint the gateway exposes is one [`EndpointDescriptor`]
//! row: pure data, no per-row code generation. The dispatch facade owns the
//! single generic invoke path that merges a row's default parameters under
//! the caller's and hands the result to `dispatch`.

use serde::Serialize;

use crate::path::ApiVersion;

/// Minimum provider subscription an endpoint is known to require.
///
/// Informational only: dispatch never branches on it, but the error
/// classifier attaches it so callers can surface "needs at least plan X"
/// next to a permission failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanTier {
    #[serde(rename = "Basic(EOD)")]
    Basic,
    #[serde(rename = "Starter+")]
    Starter,
    #[serde(rename = "Premium+")]
    Premium,
    #[serde(rename = "Ultimate+")]
    Ultimate,
}

impl PlanTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic(EOD)",
            Self::Starter => "Starter+",
            Self::Premium => "Premium+",
            Self::Ultimate => "Ultimate+",
        }
    }
}

/// One catalog row: a named, uniformly-invokable upstream endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndpointDescriptor {
    /// Action name callers invoke the endpoint by.
    pub name: &'static str,
    pub version: ApiVersion,
    /// Path segment under the version prefix.
    pub path: &'static str,
    pub description: &'static str,
    pub plan_hint: PlanTier,
    /// Parameters applied when the caller does not override them.
    pub defaults: &'static [(&'static str, &'static str)],
    /// Cheap known-good parameters used by access probes.
    pub probe_params: &'static [(&'static str, &'static str)],
}

/// Endpoints exposed as callable actions.
pub const CATALOG: &[EndpointDescriptor] = &[
    EndpointDescriptor {
        name: "search_name",
        version: ApiVersion::Stable,
        path: "search-name",
        description: "Find tickers by company name",
        plan_hint: PlanTier::Basic,
        defaults: &[("limit", "10")],
        probe_params: &[("query", "Apple"), ("limit", "1")],
    },
    EndpointDescriptor {
        name: "search_symbol",
        version: ApiVersion::Stable,
        path: "search-symbol",
        description: "Search by symbol, name, ISIN, CIK or CUSIP",
        plan_hint: PlanTier::Basic,
        defaults: &[("limit", "10")],
        probe_params: &[("query", "AAPL"), ("limit", "1")],
    },
    EndpointDescriptor {
        name: "available_industries",
        version: ApiVersion::Stable,
        path: "available-industries",
        description: "List industries covered by the provider",
        plan_hint: PlanTier::Basic,
        defaults: &[],
        probe_params: &[],
    },
    EndpointDescriptor {
        name: "quote",
        version: ApiVersion::Stable,
        path: "quote",
        description: "Real-time quote",
        plan_hint: PlanTier::Starter,
        defaults: &[],
        probe_params: &[("symbol", "AAPL")],
    },
    EndpointDescriptor {
        name: "quote_short",
        version: ApiVersion::Stable,
        path: "quote-short",
        description: "Compact quote (price and volume only)",
        plan_hint: PlanTier::Basic,
        defaults: &[],
        probe_params: &[("symbol", "AAPL")],
    },
    EndpointDescriptor {
        name: "historical_price_full",
        version: ApiVersion::Stable,
        path: "historical-price-eod/full",
        description: "Full end-of-day price history",
        plan_hint: PlanTier::Basic,
        defaults: &[],
        probe_params: &[("symbol", "AAPL")],
    },
    EndpointDescriptor {
        name: "historical_price_light",
        version: ApiVersion::Stable,
        path: "historical-price-eod/light",
        description: "Trimmed end-of-day price history",
        plan_hint: PlanTier::Basic,
        defaults: &[],
        probe_params: &[("symbol", "AAPL")],
    },
    EndpointDescriptor {
        name: "income_statement",
        version: ApiVersion::Stable,
        path: "income-statement",
        description: "Income statements",
        plan_hint: PlanTier::Starter,
        defaults: &[("period", "annual"), ("limit", "1")],
        probe_params: &[("symbol", "AAPL"), ("limit", "1")],
    },
    EndpointDescriptor {
        name: "balance_sheet_statement",
        version: ApiVersion::Stable,
        path: "balance-sheet-statement",
        description: "Balance sheet statements",
        plan_hint: PlanTier::Starter,
        defaults: &[("period", "annual"), ("limit", "1")],
        probe_params: &[("symbol", "AAPL"), ("limit", "1")],
    },
    EndpointDescriptor {
        name: "cash_flow_statement",
        version: ApiVersion::Stable,
        path: "cash-flow-statement",
        description: "Cash flow statements",
        plan_hint: PlanTier::Starter,
        defaults: &[("period", "annual"), ("limit", "1")],
        probe_params: &[("symbol", "AAPL"), ("limit", "1")],
    },
    EndpointDescriptor {
        name: "financial_statement_full_as_reported",
        version: ApiVersion::Stable,
        path: "financial-statement-full-as-reported",
        description: "Full statements exactly as reported to regulators",
        plan_hint: PlanTier::Starter,
        defaults: &[("limit", "1")],
        probe_params: &[("symbol", "AAPL"), ("limit", "1")],
    },
    EndpointDescriptor {
        name: "key_metrics",
        version: ApiVersion::Stable,
        path: "key-metrics",
        description: "Key per-share and valuation metrics",
        plan_hint: PlanTier::Starter,
        defaults: &[("limit", "5")],
        probe_params: &[("symbol", "AAPL"), ("limit", "1")],
    },
    EndpointDescriptor {
        name: "ratios",
        version: ApiVersion::Stable,
        path: "ratios",
        description: "Financial ratios",
        plan_hint: PlanTier::Starter,
        defaults: &[("limit", "5")],
        probe_params: &[("symbol", "AAPL"), ("limit", "1")],
    },
    EndpointDescriptor {
        name: "profile",
        version: ApiVersion::Stable,
        path: "profile",
        description: "Company profile",
        plan_hint: PlanTier::Starter,
        defaults: &[],
        probe_params: &[("symbol", "AAPL")],
    },
    EndpointDescriptor {
        name: "profile_cik",
        version: ApiVersion::Stable,
        path: "profile-cik",
        description: "Company profile looked up by CIK",
        plan_hint: PlanTier::Starter,
        defaults: &[],
        probe_params: &[("cik", "0000320193")],
    },
];

/// Looks up a catalog row by action name.
pub fn find(name: &str) -> Option<&'static EndpointDescriptor> {
    CATALOG.iter().find(|descriptor| descriptor.name == name)
}

/// Plan hint for a raw (version, path) pair, when the catalog knows it.
pub fn plan_hint_for(version: ApiVersion, path: &str) -> Option<PlanTier> {
    CATALOG
        .iter()
        .find(|descriptor| descriptor.path == path && descriptor.version == version)
        .map(|descriptor| descriptor.plan_hint)
}
