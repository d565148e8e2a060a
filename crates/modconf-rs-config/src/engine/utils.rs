//! Key path and value rendering helpers.

use serde_json::Value;

/// Join nested paths for diagnostics.
pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Suffix a path with an array index.
pub(super) fn index_path(prefix: &str, idx: usize) -> String {
    format!("{prefix}[{idx}]")
}

/// Render a value for log output: strings bare, everything else as JSON.
pub(super) fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
