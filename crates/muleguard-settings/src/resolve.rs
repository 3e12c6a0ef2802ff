use crate::model::{RuleRange, RuleSetV1};
use anyhow::Context;
use muleguard_domain::EngineOptions;
use muleguard_types::Rule;
use regex::Regex;
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    /// Replaces `config.environments` when set.
    pub environments: Option<Vec<String>>,
    /// Rule ids to disable for this run.
    pub disabled_rules: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ResolvedRuleSet {
    pub rules: Vec<Rule>,
    pub options: EngineOptions,
    folder_pattern: Option<Regex>,
}

impl ResolvedRuleSet {
    /// Whether a project folder is a configuration project. The pattern must match the whole name.
    pub fn is_config_project(&self, folder_name: &str) -> bool {
        self.folder_pattern
            .as_ref()
            .is_some_and(|re| re.is_match(folder_name))
    }

    /// Rules that apply to the project in `folder_name`.
    pub fn rules_for(&self, folder_name: &str) -> Vec<Rule> {
        self.rules_in_scope(self.is_config_project(folder_name))
    }

    /// Whether configuration projects and code projects get different rules. True when both an
    /// environment range and a folder pattern are configured.
    pub fn splits_projects(&self) -> bool {
        self.options.environment_scoped.is_some() && self.folder_pattern.is_some()
    }

    /// Configuration projects get only the environment-scoped rules and every other project gets
    /// the rest. Without a split every rule applies to both.
    pub fn rules_in_scope(&self, config_project: bool) -> Vec<Rule> {
        let (Some(range), Some(_)) = (&self.options.environment_scoped, &self.folder_pattern) else {
            return self.rules.clone();
        };
        self.rules
            .iter()
            .filter(|r| {
                let scoped = r.numeric_id().is_some_and(|id| range.contains(&id));
                scoped == config_project
            })
            .cloned()
            .collect()
    }
}

pub fn resolve_rule_set(
    rule_set: RuleSetV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedRuleSet> {
    let RuleSetV1 {
        schema,
        config,
        mut rules,
    } = rule_set;

    if let Some(schema) = schema.as_deref() {
        if schema != "muleguard.rules.v1" {
            anyhow::bail!("unsupported rule-set schema: {schema} (expected muleguard.rules.v1)");
        }
    }

    let mut seen = BTreeSet::new();
    for rule in &rules {
        if rule.id.trim().is_empty() {
            anyhow::bail!("rule with empty id (name: {:?})", rule.name);
        }
        if !seen.insert(rule.id.as_str()) {
            anyhow::bail!("duplicate rule id: {}", rule.id);
        }
    }

    for id in &overrides.disabled_rules {
        let rule = rules
            .iter_mut()
            .find(|r| &r.id == id)
            .with_context(|| format!("cannot disable unknown rule: {id}"))?;
        rule.enabled = false;
    }

    let environment_scoped = config
        .environment_rules
        .map(|RuleRange { start, end }| {
            if start > end {
                anyhow::bail!("invalid environment_rules range: start {start} > end {end}");
            }
            Ok(start..=end)
        })
        .transpose()?;

    let folder_pattern = config
        .folder_pattern
        .as_deref()
        .map(|p| {
            Regex::new(&format!("^(?:{p})$"))
                .with_context(|| format!("invalid folder_pattern: {p}"))
        })
        .transpose()?;

    let environments = overrides.environments.unwrap_or(config.environments);

    Ok(ResolvedRuleSet {
        rules,
        options: EngineOptions {
            environments,
            environment_scoped,
        },
        folder_pattern,
    })
}
