//! CLI argument definitions for marketgate.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `call` | Call any upstream endpoint by name or raw path |
//! | `quote` | Real-time quote shortcut |
//! | `search` | Company name search shortcut |
//! | `endpoints` | List the endpoint catalog |
//! | `probe` | Check catalog endpoint access with the configured key |
//!
//! # Examples
//!
//! ```bash
//! # Generic call against the stable namespace
//! marketgate call key-metrics --param symbol=AAPL --param limit=5
//!
//! # Paginated call
//! marketgate call profile-bulk --paginate --max-pages 3
//!
//! # Shortcuts
//! marketgate quote AAPL
//! marketgate search "Apple" --limit 5
//!
//! # Catalog inspection
//! marketgate endpoints
//! marketgate probe quote
//! ```

use clap::{Args, Parser, Subcommand};

/// Uniform gateway to the upstream financial data provider.
#[derive(Debug, Parser)]
#[command(
    name = "marketgate",
    version,
    about = "Financial data endpoint gateway",
    long_about = "Marketgate exposes the upstream provider's REST catalog as uniformly-shaped \
callable actions, with retries, pagination and structured error reporting.\n\
\n\
The upstream credential is read from MARKETGATE_FMP_API_KEY (or FMP_API_KEY), \
or supplied per call with --api-key."
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Call any upstream endpoint.
    Call(CallArgs),
    /// Fetch a real-time quote.
    Quote(QuoteArgs),
    /// Search instruments by company name.
    Search(SearchArgs),
    /// List the endpoint catalog.
    Endpoints(EndpointsArgs),
    /// Probe catalog endpoint access.
    Probe(ProbeArgs),
}

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Endpoint name under the selected namespace, or an absolute path/URL.
    pub endpoint: String,

    /// Version namespace: stable, v3, v4, legacy or raw.
    #[arg(long, default_value = "stable")]
    pub service: String,

    /// HTTP method (GET or POST).
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Query parameter, repeatable: --param symbol=AAPL
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Convenience symbol parameter; an explicit --param symbol=... wins.
    #[arg(long)]
    pub symbol: Option<String>,

    /// Explicit upstream credential for this call.
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Accumulate pages until an empty page or --max-pages.
    #[arg(long, default_value_t = false)]
    pub paginate: bool,

    /// Page query parameter name.
    #[arg(long, default_value = "page")]
    pub page_param: String,

    /// First page index.
    #[arg(long, default_value_t = 0)]
    pub start_page: u32,

    /// Page count bound.
    #[arg(long, default_value_t = 1)]
    pub max_pages: u32,
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Ticker symbol, e.g. AAPL.
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Company name or fragment.
    pub query: String,

    /// Maximum number of results.
    #[arg(long, default_value_t = 10)]
    pub limit: u32,

    /// Restrict to one exchange.
    #[arg(long)]
    pub exchange: Option<String>,
}

#[derive(Debug, Args)]
pub struct EndpointsArgs {}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Catalog action to probe; probes the whole catalog when omitted.
    pub action: Option<String>,
}
