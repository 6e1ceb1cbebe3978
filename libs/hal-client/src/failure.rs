//! Human-readable detail strings for failed write responses.
//!
//! The exact formats are consumed by tooling that parses them for display.

use crate::transport::TransportResponse;
use serde_json::Value;

/// Detail used when a JSON error body has no usable `errors` attribute.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Describes a failed response.
///
/// A JSON body that parses is summarised with [`describe_errors`]; any other
/// body yields `"<code> <reason> - <first line of body>"`.
#[must_use]
pub fn failure_detail(response: &TransportResponse) -> String {
    if response.is_json()
        && let Ok(body) = serde_json::from_slice::<Value>(&response.body)
    {
        return describe_errors(&body);
    }
    format!("{} - {}", response.status_reason(), response.first_line())
}

/// Summarises the `errors` attribute of a JSON error body.
///
/// - list: entries joined with `", "`
/// - object: `"key: value"` pairs joined with `", "`
/// - anything else: [`UNKNOWN_ERROR`]
#[must_use]
pub fn describe_errors(body: &Value) -> String {
    match body.get("errors") {
        Some(Value::Array(entries)) => join(entries.iter().map(render)),
        Some(Value::Object(fields)) => {
            join(fields.iter().map(|(key, value)| format!("{key}: {}", render(value))))
        }
        _ => UNKNOWN_ERROR.to_owned(),
    }
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(", ")
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => format!("[{}]", join(items.iter().map(render))),
        other => other.to_string(),
    }
}
