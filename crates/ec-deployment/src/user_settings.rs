//! Free-form user settings, kept as opaque text in state.

use crate::diagnostics::Diagnostic;

/// Parses a JSON setting kept as text in state. An empty value means unset.
pub fn parse_json(
    value: Option<&str>,
    path: &str,
) -> Result<Option<serde_json::Value>, Diagnostic> {
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    serde_json::from_str(value)
        .map(Some)
        .map_err(|err| Diagnostic::error(format!("failed expanding {path}"), err).at(path))
}

/// Returns `value` unless it is empty.
pub fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|value| !value.is_empty()).cloned()
}
