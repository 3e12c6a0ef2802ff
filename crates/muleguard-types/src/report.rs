use serde::{Deserialize, Serialize};

/// Outcome of one check against one project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub rule_id: String,
    pub description: String,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    pub fn pass(rule_id: &str, description: &str, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            description: description.to_string(),
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(rule_id: &str, description: &str, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            description: description.to_string(),
            passed: false,
            message: message.into(),
        }
    }
}

/// All check results of one evaluated rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    pub id: String,
    pub name: String,
    pub severity: String,
    pub passed: bool,
    pub checks: Vec<CheckResult>,
}

impl RuleResult {
    /// The rule passes iff every one of its checks passed.
    pub fn from_checks(id: &str, name: &str, severity: &str, checks: Vec<CheckResult>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            severity: severity.to_string(),
            passed: checks.iter().all(|c| c.passed),
            checks,
        }
    }

    /// Failed checks only, in evaluation order.
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Per-project outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub project_path: String,
    #[serde(default)]
    pub passed: Vec<RuleResult>,
    #[serde(default)]
    pub failed: Vec<RuleResult>,
    #[serde(default)]
    pub skipped: Vec<String>,
}

impl ValidationReport {
    pub fn new(project_path: impl Into<String>) -> Self {
        Self {
            project_path: project_path.into(),
            ..Self::default()
        }
    }

    pub fn add_passed(&mut self, rule: RuleResult) {
        self.passed.push(rule);
    }

    pub fn add_failed(&mut self, rule: RuleResult) {
        self.failed.push(rule);
    }

    pub fn add_skipped(&mut self, label: impl Into<String>) {
        self.skipped.push(label.into());
    }

    /// Files a rule result into `passed` or `failed` according to its verdict.
    pub fn record(&mut self, rule: RuleResult) {
        if rule.passed {
            self.add_passed(rule);
        } else {
            self.add_failed(rule);
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn evaluated(&self) -> usize {
        self.passed.len() + self.failed.len()
    }
}
