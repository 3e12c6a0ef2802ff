//! Markdown rendering of a report envelope.

use crate::report::MuleguardReport;
use muleguard_types::{RuleResult, ValidationReport};

pub fn render_markdown(report: &MuleguardReport) -> String {
    let mut out = String::new();

    out.push_str("# Muleguard report\n\n");
    let verdict = if report.has_failures() { "FAIL" } else { "PASS" };
    out.push_str(&format!(
        "- Verdict: **{}**\n- Projects: {}\n- Failed rules: {}\n\n",
        verdict,
        report.projects.len(),
        report.failed_rules()
    ));

    if report.projects.is_empty() {
        out.push_str("No projects validated.\n");
        return out;
    }

    for project in &report.projects {
        render_project(&mut out, project);
    }
    out
}

fn render_project(out: &mut String, project: &ValidationReport) {
    out.push_str(&format!("## {}\n\n", project.project_path));
    out.push_str(&format!(
        "{} passed, {} failed, {} skipped\n\n",
        project.passed.len(),
        project.failed.len(),
        project.skipped.len()
    ));

    for rule in &project.failed {
        render_failed_rule(out, rule);
    }
    for label in &project.skipped {
        out.push_str(&format!("- skipped: {}\n", label));
    }
    if !project.failed.is_empty() || !project.skipped.is_empty() {
        out.push('\n');
    }
}

fn render_failed_rule(out: &mut String, rule: &RuleResult) {
    out.push_str(&format!("- [{}] `{}` {}\n", rule.severity, rule.id, rule.name));
    for check in rule.failures() {
        out.push_str(&format!("  - {}\n", check.description));
        for line in check.message.lines().filter(|l| !l.trim().is_empty()) {
            out.push_str(&format!("    {}\n", line.trim_end()));
        }
    }
}
