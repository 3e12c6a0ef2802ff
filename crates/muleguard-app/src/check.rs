//! The `check` use cases: validate one project, or every project below a parent folder.

use crate::report::MuleguardReport;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use muleguard_domain::Plan;
use muleguard_settings::ResolvedRuleSet;
use muleguard_types::ValidationReport;
use rayon::prelude::*;
use time::OffsetDateTime;

/// Folder names never treated as projects by [`discover_projects`].
const IGNORED_DIRS: &[&str] = &["muleguard-reports", "target", "bin", "build"];

/// Input for the single-project check use case.
#[derive(Clone, Copy, Debug)]
pub struct CheckInput<'a> {
    pub project_root: &'a Utf8Path,
    pub rule_set: &'a ResolvedRuleSet,
}

/// Input for the check-all use case.
#[derive(Clone, Copy, Debug)]
pub struct CheckAllInput<'a> {
    /// Folder whose immediate subdirectories are the projects.
    pub parent: &'a Utf8Path,
    pub rule_set: &'a ResolvedRuleSet,
}

/// The rule set compiled once for a run. Code projects and configuration projects each get
/// their own plan when the rule set splits them.
#[derive(Debug)]
pub struct CompiledRuleSet<'a> {
    rule_set: &'a ResolvedRuleSet,
    code: Plan,
    config: Option<Plan>,
}

impl<'a> CompiledRuleSet<'a> {
    pub fn compile(rule_set: &'a ResolvedRuleSet) -> Self {
        let (code, config) = if rule_set.splits_projects() {
            (
                Plan::compile(&rule_set.rules_in_scope(false)),
                Some(Plan::compile(&rule_set.rules_in_scope(true))),
            )
        } else {
            (Plan::compile(&rule_set.rules), None)
        };
        let compiled = Self {
            rule_set,
            code,
            config,
        };
        compiled.warn_on_misconfigured_checks();
        compiled
    }

    /// The plan for the project in `folder_name`.
    pub fn plan_for(&self, folder_name: &str) -> &Plan {
        match &self.config {
            Some(config) if self.rule_set.is_config_project(folder_name) => config,
            _ => &self.code,
        }
    }

    /// Validate one project with the plan that applies to its folder.
    pub fn validate(&self, root: &Utf8Path) -> ValidationReport {
        let folder = folder_name(root);
        let plan = self.plan_for(&folder);
        tracing::debug!(
            project = %root,
            config_project = self.rule_set.is_config_project(&folder),
            rules = plan.rules().count(),
            "validating project"
        );
        plan.evaluate(root, &self.rule_set.options)
    }

    fn warn_on_misconfigured_checks(&self) {
        for plan in std::iter::once(&self.code).chain(&self.config) {
            for (rule, check, err) in plan.diagnostics() {
                tracing::warn!(rule, check, error = %err, "check is misconfigured");
            }
        }
    }
}

/// Validate one project with the rules that apply to its folder.
pub fn validate_project(root: &Utf8Path, rule_set: &ResolvedRuleSet) -> ValidationReport {
    CompiledRuleSet::compile(rule_set).validate(root)
}

pub fn run_check(input: CheckInput<'_>) -> MuleguardReport {
    let started_at = OffsetDateTime::now_utc();
    let report = validate_project(input.project_root, input.rule_set);
    MuleguardReport::finish(started_at, vec![report])
}

/// Discover projects below `parent` and validate them in parallel. Reports keep discovery order.
pub fn run_check_all(input: CheckAllInput<'_>) -> anyhow::Result<MuleguardReport> {
    let started_at = OffsetDateTime::now_utc();
    let projects = discover_projects(input.parent, input.rule_set)?;
    if projects.is_empty() {
        tracing::warn!(parent = %input.parent, "no projects found");
    }

    let compiled = CompiledRuleSet::compile(input.rule_set);
    let reports: Vec<ValidationReport> = projects
        .par_iter()
        .map(|root| compiled.validate(root))
        .collect();
    Ok(MuleguardReport::finish(started_at, reports))
}

/// Immediate subdirectories of `parent` that look like projects, sorted by path.
///
/// A directory is a project when it holds a `pom.xml` or `mule-artifact.json`, or when its name
/// matches the rule set's configuration-project pattern. Hidden and build-output folders are
/// skipped.
pub fn discover_projects(
    parent: &Utf8Path,
    rule_set: &ResolvedRuleSet,
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    if !parent.is_dir() {
        anyhow::bail!("parent folder does not exist: {parent}");
    }

    let mut projects = Vec::new();
    for entry in parent
        .read_dir_utf8()
        .with_context(|| format!("read directory: {parent}"))?
    {
        let entry = entry.with_context(|| format!("read directory entry in: {parent}"))?;
        let name = entry.file_name();
        if name.starts_with('.') || IGNORED_DIRS.contains(&name) || !entry.path().is_dir() {
            continue;
        }
        let path = entry.path();
        let code_project =
            path.join("pom.xml").is_file() || path.join("mule-artifact.json").is_file();
        if code_project || rule_set.is_config_project(name) {
            projects.push(path.to_path_buf());
        }
    }
    projects.sort();
    Ok(projects)
}

fn folder_name(root: &Utf8Path) -> String {
    root.file_name()
        .map(str::to_string)
        .or_else(|| {
            root.canonicalize_utf8()
                .ok()
                .and_then(|p| p.file_name().map(str::to_string))
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use muleguard_settings::{Overrides, parse_rules_toml, resolve_rule_set};
    use tempfile::TempDir;

    const RULES: &str = r#"
[config]
environments = ["dev"]
folder_pattern = ".*-config"
environment_rules = { start = 100, end = 199 }

[[rules]]
id = "RULE-001"
name = "No hardcoded passwords"
severity = "HIGH"

[[rules.checks]]
type = "GENERIC_TOKEN_SEARCH_FORBIDDEN"
[rules.checks.params]
filePatterns = ["src/main/mule/**/*.xml"]
tokens = ["password="]

[[rules]]
id = "RULE-101"
name = "Timeout configured"
severity = "MEDIUM"

[[rules.checks]]
type = "CONFIG_PROPERTY_EXISTS"
[rules.checks.params]
fileExtensions = [".properties"]
propertyNames = ["timeout"]
"#;

    fn rule_set() -> ResolvedRuleSet {
        resolve_rule_set(parse_rules_toml(RULES).unwrap(), Overrides::default()).unwrap()
    }

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn write(root: &Utf8Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn workspace() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        write(&root, "orders-api/pom.xml", "<project/>");
        write(
            &root,
            "orders-api/src/main/mule/flow.xml",
            "<mule><db:config password=\"secret\"/></mule>",
        );
        write(&root, "billing-api/mule-artifact.json", "{}");
        write(&root, "billing-api/src/main/mule/flow.xml", "<mule/>");
        write(&root, "orders-config/dev.properties", "timeout=30\n");
        write(&root, "notes/readme.txt", "not a project");
        write(&root, "target/pom.xml", "<project/>");
        write(&root, ".git/pom.xml", "<project/>");
        (dir, root)
    }

    #[test]
    fn discovers_code_and_config_projects_only() {
        let (_dir, root) = workspace();
        let found = discover_projects(&root, &rule_set()).unwrap();
        let names: Vec<&str> = found.iter().filter_map(|p| p.file_name()).collect();
        assert_eq!(names, vec!["billing-api", "orders-api", "orders-config"]);
    }

    #[test]
    fn discover_fails_for_missing_parent() {
        let (_dir, root) = workspace();
        assert!(discover_projects(&root.join("missing"), &rule_set()).is_err());
    }

    #[test]
    fn config_projects_run_environment_rules_only() {
        let (_dir, root) = workspace();
        let set = rule_set();

        let config = validate_project(&root.join("orders-config"), &set);
        let ids: Vec<&str> = config.passed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["RULE-101"]);
        assert!(config.failed.is_empty());

        let api = validate_project(&root.join("orders-api"), &set);
        assert_eq!(api.failed.len(), 1);
        assert_eq!(api.failed[0].id, "RULE-001");
        assert!(api.passed.is_empty());
    }

    #[test]
    fn one_plan_serves_every_project_of_a_kind() {
        let set = rule_set();
        let compiled = CompiledRuleSet::compile(&set);

        let api = compiled.plan_for("orders-api");
        assert!(std::ptr::eq(api, compiled.plan_for("billing-api")));
        assert!(std::ptr::eq(
            compiled.plan_for("orders-config"),
            compiled.plan_for("billing-config")
        ));
        assert!(!std::ptr::eq(api, compiled.plan_for("orders-config")));

        let ids = |plan: &Plan| plan.rules().map(|r| r.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(api), vec!["RULE-001"]);
        assert_eq!(ids(compiled.plan_for("orders-config")), vec!["RULE-101"]);
    }

    #[test]
    fn unsplit_rule_set_compiles_a_single_plan() {
        let set = resolve_rule_set(
            parse_rules_toml(&RULES.replace("folder_pattern = \".*-config\"\n", "")).unwrap(),
            Overrides::default(),
        )
        .unwrap();
        let compiled = CompiledRuleSet::compile(&set);
        assert!(std::ptr::eq(
            compiled.plan_for("orders-api"),
            compiled.plan_for("orders-config")
        ));
        assert_eq!(compiled.plan_for("orders-api").rules().count(), 2);
    }

    #[test]
    fn check_all_reports_every_project_in_order() {
        let (_dir, root) = workspace();
        let set = rule_set();
        let report = run_check_all(CheckAllInput {
            parent: &root,
            rule_set: &set,
        })
        .unwrap();

        let paths: Vec<&str> = report
            .projects
            .iter()
            .map(|p| p.project_path.as_str())
            .collect();
        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("billing-api"));
        assert!(paths[2].ends_with("orders-config"));
        assert_eq!(report.failed_rules(), 1);
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn single_check_wraps_one_project() {
        let (_dir, root) = workspace();
        let set = rule_set();
        let project = root.join("billing-api");
        let report = run_check(CheckInput {
            project_root: &project,
            rule_set: &set,
        });
        assert_eq!(report.projects.len(), 1);
        assert!(!report.has_failures());
    }
}
