use marketgate_core::{find_endpoint, ApiVersion, ClassifiedError, ErrorKind};

use crate::cli::ProbeArgs;
use crate::error::CliError;
use crate::output::CliEnvelope;

use super::Gateway;

pub async fn run(args: &ProbeArgs, dispatcher: &Gateway) -> Result<CliEnvelope, CliError> {
    match &args.action {
        Some(action) => {
            let Some(descriptor) = find_endpoint(action) else {
                return Ok(CliEnvelope::failure(ClassifiedError {
                    kind: ErrorKind::NotFound,
                    http_status: None,
                    message: format!("unknown catalog action '{action}'"),
                    retryable: false,
                    endpoint: action.clone(),
                    version: ApiVersion::Stable,
                    plan_hint: None,
                }));
            };

            let report = dispatcher.probe(descriptor).await;
            let ok = report.ok;
            let data = serde_json::to_value(report)?;
            Ok(if ok {
                CliEnvelope::success(data)
            } else {
                // Probe reports carry their own error detail.
                let mut envelope = CliEnvelope::success(data);
                envelope.ok = false;
                envelope
            })
        }
        None => {
            let reports = dispatcher.probe_all().await;
            let ok = reports.iter().all(|report| report.ok);
            let data = serde_json::to_value(reports)?;
            let mut envelope = CliEnvelope::success(data);
            envelope.ok = ok;
            Ok(envelope)
        }
    }
}
