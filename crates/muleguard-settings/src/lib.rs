//! Rule-set parsing and resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves rule sets provided as strings.

#![forbid(unsafe_code)]

mod model;
mod resolve;

pub use model::{RuleRange, RuleSetConfig, RuleSetV1};
pub use resolve::{Overrides, ResolvedRuleSet};

/// Parse `rules.toml` (or equivalent) into a typed model.
pub fn parse_rules_toml(input: &str) -> anyhow::Result<RuleSetV1> {
    let rules: RuleSetV1 = toml::from_str(input)?;
    Ok(rules)
}

/// Validate the rule set and apply caller overrides.
pub fn resolve_rule_set(
    rules: RuleSetV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedRuleSet> {
    resolve::resolve_rule_set(rules, overrides)
}
