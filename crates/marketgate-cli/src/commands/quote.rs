use std::collections::BTreeMap;

use crate::cli::QuoteArgs;
use crate::error::CliError;
use crate::output::CliEnvelope;

use super::{into_envelope, Gateway};

pub async fn run(args: &QuoteArgs, dispatcher: &Gateway) -> Result<CliEnvelope, CliError> {
    let mut params = BTreeMap::new();
    params.insert(String::from("symbol"), args.symbol.clone());

    Ok(into_envelope(dispatcher.invoke("quote", params, None).await))
}
