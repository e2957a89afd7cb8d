//! JSON payloads returned to the agent.

use serde_json::{Value, json};
use x402_actions::ActionError;

/// Renders a refusal or failure as `{error, message, details, ...}`.
#[must_use]
pub fn error_payload(err: &ActionError) -> Value {
    let mut payload = json!({
        "error": true,
        "message": err.to_string(),
        "details": err.details(),
    });
    match err {
        ActionError::NoUsdcOption { original_options } => {
            payload["originalOptions"] = json!(original_options);
        }
        ActionError::PaginationExhausted { skipped_offsets } => {
            payload["skippedOffsets"] = json!(skipped_offsets);
        }
        _ => {}
    }
    if let Some(suggestion) = err.suggestion() {
        payload["suggestion"] = json!(suggestion);
    }
    payload
}

/// Serializes a payload the way agents receive it.
#[must_use]
pub fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
