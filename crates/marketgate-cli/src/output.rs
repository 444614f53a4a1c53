use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use marketgate_core::ClassifiedError;

use crate::error::CliError;

/// Envelope around every command's machine-readable output.
#[derive(Debug, Serialize)]
pub struct CliEnvelope {
    pub request_id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ClassifiedError>,
}

impl CliEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: ClassifiedError) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

pub fn render(envelope: &CliEnvelope, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    println!("{payload}");
    Ok(())
}
