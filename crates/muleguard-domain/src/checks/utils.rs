use crate::dispatch::DispatchError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Parameter keys holding enum-like modes; their values are matched case-insensitively.
const MODE_KEYS: &[&str] = &["searchMode", "matchMode", "validationType", "parseMode"];

/// Deserializes a family's typed parameters from the free-form map.
pub fn parse_params<T: DeserializeOwned>(params: &Map<String, Value>) -> Result<T, DispatchError> {
    let mut normalized = params.clone();
    for key in MODE_KEYS {
        if let Some(Value::String(s)) = normalized.get_mut(*key) {
            *s = s.trim().to_ascii_uppercase();
        }
    }
    serde_json::from_value(Value::Object(normalized))
        .map_err(|err| DispatchError::invalid("params", err.to_string()))
}

pub fn default_true() -> bool {
    true
}

/// Accepts a single string or a list of strings.
pub fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

/// Accepts any scalar and keeps its text (`8081`, `true`, `"x"` -> `8081`, `true`, `x`).
pub fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .filter(|v| !v.is_null())
        .map(|v| scalar_text(&v)))
}

/// Text form used for value comparisons: strings as-is, everything else as JSON.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn require_non_empty<T>(key: &str, items: &[T]) -> Result<(), DispatchError> {
    if items.is_empty() {
        Err(DispatchError::invalid(key, "must be a non-empty list"))
    } else {
        Ok(())
    }
}

pub fn require<T>(key: &str, value: Option<T>) -> Result<T, DispatchError> {
    value.ok_or_else(|| DispatchError::invalid(key, "is required"))
}

/// Heading followed by one bullet per item.
pub fn bullets(heading: &str, items: &[String]) -> String {
    format!("{heading}\n• {}", items.join("\n• "))
}

pub fn eq_case(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

pub fn contains_case(haystack: &str, needle: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        haystack.contains(needle)
    } else {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}
