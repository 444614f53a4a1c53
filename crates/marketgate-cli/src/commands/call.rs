use marketgate_core::{ApiVersion, CallRequest, HttpMethod, Pagination, CREDENTIAL_PARAM};

use crate::cli::CallArgs;
use crate::error::CliError;
use crate::output::CliEnvelope;

use super::{into_envelope, Gateway};

pub async fn run(args: &CallArgs, dispatcher: &Gateway) -> Result<CliEnvelope, CliError> {
    let version = ApiVersion::parse(&args.service);
    let method = HttpMethod::parse(&args.method);

    let mut request = CallRequest::new(version, &args.endpoint, method);
    for pair in &args.params {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CliError::InvalidParam(pair.clone()))?;
        request = request.with_param(key, value);
    }

    if let Some(symbol) = &args.symbol {
        request = request.with_symbol(symbol);
    }
    if let Some(api_key) = &args.api_key {
        request = request.with_param(CREDENTIAL_PARAM, api_key);
    }
    if args.paginate {
        let pagination = Pagination::new(&args.page_param, args.start_page, args.max_pages)?;
        request = request.with_pagination(pagination);
    }

    Ok(into_envelope(dispatcher.dispatch(request).await))
}
