use serde_json::Value;

/// Parses strings that look like a JSON object or array; anything else is returned unchanged.
///
/// - Only `{...}` / `[...]` shaped text (after trimming) is handed to the parser.
/// - A failed parse yields the original, untrimmed string.
pub fn coerce(value: &Value) -> Value {
    let Value::String(raw) = value else {
        return value.clone();
    };
    if !looks_like_json(raw) {
        return value.clone();
    }
    serde_json::from_str::<Value>(raw.trim()).unwrap_or_else(|_| value.clone())
}

/// True when `value` is an object exposing a list-valued `variables` field.
pub fn is_target_shape(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|obj| obj.get("variables"))
        .is_some_and(Value::is_array)
}

fn looks_like_json(raw: &str) -> bool {
    let trimmed = raw.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}
