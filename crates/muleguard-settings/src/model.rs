use muleguard_types::Rule;
use serde::{Deserialize, Serialize};

/// `rules.toml` schema v1.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSetV1 {
    /// Optional schema string for tooling (`muleguard.rules.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub config: RuleSetConfig,

    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetConfig {
    /// Environment names injected into environment-scoped property-file checks.
    #[serde(default)]
    pub environments: Vec<String>,

    /// Regex over project folder names that marks a configuration project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_pattern: Option<String>,

    /// Numeric rule ids that are environment scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_rules: Option<RuleRange>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRange {
    pub start: u32,
    pub end: u32,
}
