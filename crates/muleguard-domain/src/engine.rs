use crate::context::{Project, RuleContext};
use crate::dispatch::{self, DispatchError, Matcher};
use camino::Utf8Path;
use muleguard_types::{CheckResult, Rule, RuleResult, ValidationReport};
use std::any::Any;
use std::ops::RangeInclusive;
use std::panic::{self, AssertUnwindSafe};

/// Knobs supplied by the caller for one evaluation.
#[derive(Clone, Debug, Default)]
pub struct EngineOptions {
    /// Global environment names for property-file checks.
    pub environments: Vec<String>,
    /// Numeric rule ids that receive `environments`. `None` injects nothing.
    pub environment_scoped: Option<RangeInclusive<u32>>,
}

impl EngineOptions {
    fn environments_for(&self, rule: &Rule) -> Option<&[String]> {
        let range = self.environment_scoped.as_ref()?;
        let id = rule.numeric_id()?;
        (range.contains(&id) && !self.environments.is_empty())
            .then_some(self.environments.as_slice())
    }
}

#[derive(Debug)]
struct CompiledCheck {
    description: String,
    matcher: Result<Matcher, DispatchError>,
}

#[derive(Debug)]
struct CompiledRule {
    rule: Rule,
    checks: Vec<CompiledCheck>,
}

/// A rule list compiled once through the dispatcher. Read-only; evaluate it against any number of
/// projects, from any thread.
#[derive(Debug)]
pub struct Plan {
    rules: Vec<CompiledRule>,
}

impl Plan {
    pub fn compile(rules: &[Rule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| CompiledRule {
                checks: if rule.enabled {
                    rule.checks
                        .iter()
                        .map(|check| CompiledCheck {
                            description: check.label().to_string(),
                            matcher: dispatch::dispatch(check),
                        })
                        .collect()
                } else {
                    Vec::new()
                },
                rule: rule.clone(),
            })
            .collect();
        Self { rules }
    }

    /// Configuration problems found while compiling, as `(rule id, check label, error)`.
    pub fn diagnostics(&self) -> Vec<(&str, &str, &DispatchError)> {
        self.rules
            .iter()
            .flat_map(|r| {
                r.checks.iter().filter_map(move |c| {
                    c.matcher
                        .as_ref()
                        .err()
                        .map(|e| (r.rule.id.as_str(), c.description.as_str(), e))
                })
            })
            .collect()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|r| &r.rule)
    }

    pub fn evaluate(&self, root: &Utf8Path, options: &EngineOptions) -> ValidationReport {
        let mut report = ValidationReport::new(root.as_str());
        let project = Project::new(root);
        let root_exists = root.is_dir();
        if !root_exists {
            tracing::warn!(path = %root, "project directory not found");
        }

        for compiled in &self.rules {
            let rule = &compiled.rule;
            if !rule.enabled {
                tracing::debug!(rule = %rule.id, "rule disabled, skipping");
                report.add_skipped(rule.skipped_label());
                continue;
            }

            let ctx = RuleContext {
                rule_id: &rule.id,
                environments: options.environments_for(rule),
            };
            let results = if root_exists {
                compiled
                    .checks
                    .iter()
                    .map(|check| run_check(check, &project, &ctx))
                    .collect()
            } else {
                vec![CheckResult::fail(
                    &rule.id,
                    &rule.name,
                    format!("Project directory not found: {root}"),
                )]
            };

            let result = RuleResult::from_checks(&rule.id, &rule.name, &rule.severity, results);
            tracing::debug!(rule = %rule.id, passed = result.passed, "rule evaluated");
            report.record(result);
        }
        report
    }
}

fn run_check(check: &CompiledCheck, project: &Project, ctx: &RuleContext<'_>) -> CheckResult {
    let matcher = match &check.matcher {
        Ok(m) => m,
        Err(err) => {
            return CheckResult::fail(
                ctx.rule_id,
                &check.description,
                format!("Execution error: {err}"),
            );
        }
    };

    match panic::catch_unwind(AssertUnwindSafe(|| matcher.run(project, ctx))) {
        Ok(outcome) => {
            tracing::debug!(
                rule = ctx.rule_id,
                check = %check.description,
                passed = outcome.passed,
                "check evaluated"
            );
            if outcome.passed {
                CheckResult::pass(ctx.rule_id, &check.description, outcome.message)
            } else {
                CheckResult::fail(ctx.rule_id, &check.description, outcome.message)
            }
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::warn!(rule = ctx.rule_id, check = %check.description, %reason, "check panicked");
            CheckResult::fail(
                ctx.rule_id,
                &check.description,
                format!("Execution error: {reason}"),
            )
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "check panicked".to_string()
    }
}

/// Compile `rules` and evaluate them against the project at `root`.
pub fn evaluate(rules: &[Rule], root: &Utf8Path, options: &EngineOptions) -> ValidationReport {
    Plan::compile(rules).evaluate(root, options)
}
