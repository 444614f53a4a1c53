mod call;
mod endpoints;
mod probe;
mod quote;
mod search;

use marketgate_core::{Dispatcher, DispatcherBuilder};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::CliEnvelope;

pub async fn run(cli: &Cli) -> Result<CliEnvelope, CliError> {
    let dispatcher = DispatcherBuilder::from_env().build();

    match &cli.command {
        Command::Call(args) => call::run(args, &dispatcher).await,
        Command::Quote(args) => quote::run(args, &dispatcher).await,
        Command::Search(args) => search::run(args, &dispatcher).await,
        Command::Endpoints(args) => endpoints::run(args),
        Command::Probe(args) => probe::run(args, &dispatcher).await,
    }
}

/// Folds a dispatch outcome into the output envelope; classified errors are
/// data, not process failures.
pub fn into_envelope(
    outcome: Result<serde_json::Value, marketgate_core::ClassifiedError>,
) -> CliEnvelope {
    match outcome {
        Ok(data) => CliEnvelope::success(data),
        Err(error) => CliEnvelope::failure(error),
    }
}

/// Used by command modules that need an explicit dispatcher type.
pub type Gateway = Dispatcher;
