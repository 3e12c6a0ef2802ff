use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named compliance requirement made of one or more checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub checks: Vec<Check>,
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    /// The last run of ASCII digits in the id (`RULE-101` -> 101).
    pub fn numeric_id(&self) -> Option<u32> {
        let bytes = self.id.as_bytes();
        let end = bytes.iter().rposition(|b| b.is_ascii_digit())? + 1;
        let start = bytes[..end]
            .iter()
            .rposition(|b| !b.is_ascii_digit())
            .map(|i| i + 1)
            .unwrap_or(0);
        self.id[start..end].parse().ok()
    }

    /// Label used for rules that were not evaluated.
    pub fn skipped_label(&self) -> String {
        format!("{}: {}", self.id, self.name)
    }
}

/// One atomic condition. `params` stay free-form here; each matcher family gives them a typed
/// shape when the check is dispatched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Check {
    #[serde(rename = "type")]
    pub check_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Check {
    pub fn new(check_type: impl Into<String>, params: Value) -> Self {
        let params = match params {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            check_type: check_type.into(),
            description: None,
            params,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description shown on results; falls back to the check type.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.check_type)
    }
}

/// Property expectation for property-file checks: the key must exist and its value must be one of
/// `values` (any of them).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyConfig {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive_name: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive_value: Option<bool>,
}
