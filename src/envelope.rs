use serde::de::DeserializeOwned;
use serde_json::Value;

/// The backend wraps some responses as `{success, count, data}` and returns
/// others bare. Single unwrap rule applied at the facade boundary: use the
/// `data` field when present, otherwise the body as-is.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode a collection leniently: anything other than an array yields an
/// empty vec, and a malformed element is skipped instead of failing the
/// whole response. Keeps rendering resilient to partial backend data.
pub fn lenient_vec<T: DeserializeOwned>(value: &Value) -> Vec<T> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

/// First string found under any of the given keys. Used to pull a backend
/// error message out of a failure body.
pub fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(Value::String(s)) = value.get(*key) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}
