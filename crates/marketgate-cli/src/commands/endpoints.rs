use marketgate_core::CATALOG;

use crate::cli::EndpointsArgs;
use crate::error::CliError;
use crate::output::CliEnvelope;

pub fn run(_args: &EndpointsArgs) -> Result<CliEnvelope, CliError> {
    let data = serde_json::to_value(CATALOG)?;
    Ok(CliEnvelope::success(data))
}
