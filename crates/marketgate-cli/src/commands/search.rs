use std::collections::BTreeMap;

use crate::cli::SearchArgs;
use crate::error::CliError;
use crate::output::CliEnvelope;

use super::{into_envelope, Gateway};

pub async fn run(args: &SearchArgs, dispatcher: &Gateway) -> Result<CliEnvelope, CliError> {
    let mut params = BTreeMap::new();
    params.insert(String::from("query"), args.query.clone());
    params.insert(String::from("limit"), args.limit.to_string());
    if let Some(exchange) = &args.exchange {
        params.insert(String::from("exchange"), exchange.clone());
    }

    Ok(into_envelope(
        dispatcher.invoke("search_name", params, None).await,
    ))
}
