use super::Outcome;
use super::utils;
use crate::context::Project;
use crate::dispatch::DispatchError;
use crate::pom::{Coordinate, PomModel};
use crate::version;
use muleguard_types::RepoPath;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_POM_PATH: &str = "pom.xml";

const MULE_PLUGIN_GROUP: &str = "org.mule.tools.maven";
const MULE_PLUGIN_ARTIFACT: &str = "mule-maven-plugin";
const MULE_PLUGIN_VERSION_PROPERTY: &str = "mule.maven.plugin.version";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PomValidationType {
    DependencyExists,
    DependencyNotExists,
    PluginExists,
    PluginNotExists,
    PropertyExists,
    PropertyNotExists,
    Parent,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoordinateSpec {
    Short(String),
    Full(CoordinateFields),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoordinateFields {
    group_id: String,
    artifact_id: String,
    #[serde(default, deserialize_with = "utils::optional_scalar")]
    version: Option<String>,
    #[serde(default, deserialize_with = "utils::optional_scalar")]
    min_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertySpec {
    name: String,
    #[serde(default, deserialize_with = "utils::optional_scalar")]
    value: Option<String>,
    #[serde(default, deserialize_with = "utils::optional_scalar")]
    expected_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Params {
    validation_type: Option<PomValidationType>,
    pom_path: Option<String>,
    #[serde(default)]
    dependencies: Vec<CoordinateSpec>,
    #[serde(default)]
    plugins: Vec<CoordinateSpec>,
    #[serde(default)]
    properties: Vec<PropertySpec>,
    property: Option<String>,
    #[serde(default, deserialize_with = "utils::optional_scalar")]
    expected_value: Option<String>,
    parent: Option<CoordinateFields>,
    group_id: Option<String>,
    artifact_id: Option<String>,
    #[serde(default, deserialize_with = "utils::optional_scalar")]
    version: Option<String>,
    version_pattern: Option<String>,
    #[serde(default = "utils::default_true")]
    require_all: bool,
}

/// A dependency or plugin the descriptor must (or must not) declare.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Requirement {
    group_id: String,
    artifact_id: String,
    version: Option<String>,
    min_version: Option<String>,
}

impl Requirement {
    fn from_spec(key: &str, spec: CoordinateSpec) -> Result<Self, DispatchError> {
        match spec {
            CoordinateSpec::Full(f) => Ok(Self {
                group_id: f.group_id,
                artifact_id: f.artifact_id,
                version: f.version,
                min_version: f.min_version,
            }),
            CoordinateSpec::Short(s) => {
                let parts: Vec<&str> = s.split(':').map(str::trim).collect();
                match parts.as_slice() {
                    [g, a] if !g.is_empty() && !a.is_empty() => Ok(Self {
                        group_id: g.to_string(),
                        artifact_id: a.to_string(),
                        version: None,
                        min_version: None,
                    }),
                    [g, a, v] if !g.is_empty() && !a.is_empty() => Ok(Self {
                        group_id: g.to_string(),
                        artifact_id: a.to_string(),
                        version: Some(v.to_string()),
                        min_version: None,
                    }),
                    _ => Err(DispatchError::invalid(
                        key,
                        format!("'{s}' is not groupId:artifactId[:version]"),
                    )),
                }
            }
        }
    }

    fn label(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

#[derive(Clone, Debug)]
enum VersionMatch {
    Exact(String),
    Pattern { source: String, regex: Regex },
}

impl VersionMatch {
    fn is_match(&self, actual: &str) -> bool {
        match self {
            VersionMatch::Exact(v) => v == actual,
            VersionMatch::Pattern { regex, .. } => regex.is_match(actual),
        }
    }

    fn describe(&self) -> &str {
        match self {
            VersionMatch::Exact(v) => v,
            VersionMatch::Pattern { source, .. } => source,
        }
    }
}

#[derive(Clone, Debug)]
enum Kind {
    Dependencies {
        required: bool,
        items: Vec<Requirement>,
    },
    Plugins {
        required: bool,
        items: Vec<Requirement>,
    },
    Properties {
        required: bool,
        items: Vec<(String, Option<String>)>,
    },
    Parent {
        group_id: String,
        artifact_id: String,
        version: Option<VersionMatch>,
    },
}

/// Dependency, plugin, property and parent rules over the Maven descriptor.
#[derive(Clone, Debug)]
pub struct PomValidation {
    pom_path: String,
    kind: Kind,
    require_all: bool,
}

impl PomValidation {
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, DispatchError> {
        let p: Params = utils::parse_params(params)?;
        let validation_type = utils::require("validationType", p.validation_type)?;

        let kind = match validation_type {
            PomValidationType::DependencyExists | PomValidationType::DependencyNotExists => {
                utils::require_non_empty("dependencies", &p.dependencies)?;
                Kind::Dependencies {
                    required: validation_type == PomValidationType::DependencyExists,
                    items: p
                        .dependencies
                        .into_iter()
                        .map(|s| Requirement::from_spec("dependencies", s))
                        .collect::<Result<_, _>>()?,
                }
            }
            PomValidationType::PluginExists | PomValidationType::PluginNotExists => {
                utils::require_non_empty("plugins", &p.plugins)?;
                Kind::Plugins {
                    required: validation_type == PomValidationType::PluginExists,
                    items: p
                        .plugins
                        .into_iter()
                        .map(|s| Requirement::from_spec("plugins", s))
                        .collect::<Result<_, _>>()?,
                }
            }
            PomValidationType::PropertyExists | PomValidationType::PropertyNotExists => {
                let mut items: Vec<(String, Option<String>)> = p
                    .properties
                    .into_iter()
                    .map(|s| (s.name, s.value.or(s.expected_value)))
                    .collect();
                if let Some(name) = p.property {
                    items.push((name, p.expected_value));
                }
                utils::require_non_empty("properties", &items)?;
                Kind::Properties {
                    required: validation_type == PomValidationType::PropertyExists,
                    items,
                }
            }
            PomValidationType::Parent => {
                let (group_id, artifact_id, exact) = match p.parent {
                    Some(parent) => (parent.group_id, parent.artifact_id, parent.version),
                    None => (
                        utils::require("groupId", p.group_id)?,
                        utils::require("artifactId", p.artifact_id)?,
                        p.version,
                    ),
                };
                let version = match (p.version_pattern, exact) {
                    (Some(pattern), _) => Some(VersionMatch::Pattern {
                        regex: wildcard_regex(&pattern)?,
                        source: pattern,
                    }),
                    (None, Some(v)) => Some(VersionMatch::Exact(v)),
                    (None, None) => None,
                };
                Kind::Parent {
                    group_id,
                    artifact_id,
                    version,
                }
            }
        };

        Ok(Self {
            pom_path: p.pom_path.unwrap_or_else(|| DEFAULT_POM_PATH.to_string()),
            kind,
            require_all: p.require_all,
        })
    }

    /// Whether an absent descriptor fails the check.
    fn needs_descriptor(&self) -> bool {
        match &self.kind {
            Kind::Dependencies { required, .. }
            | Kind::Plugins { required, .. }
            | Kind::Properties { required, .. } => *required,
            Kind::Parent { .. } => true,
        }
    }

    pub fn run(&self, project: &Project) -> Outcome {
        let path = project.root().join(&self.pom_path);
        let rel = RepoPath::relative(project.root(), &path);

        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let message = format!("Build descriptor not found: {rel}");
                return if self.needs_descriptor() {
                    Outcome::fail(message)
                } else {
                    Outcome::pass(message)
                };
            }
            Err(err) => return Outcome::fail(format!("Error reading {rel}: {err}")),
        };

        let pom = match PomModel::parse(&text) {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "could not parse build descriptor");
                return Outcome::fail(format!("Error parsing {rel}: {err}"));
            }
        };

        match &self.kind {
            Kind::Dependencies { required, items } => {
                let found = |r: &Requirement| pom.dependency_version(&r.group_id, &r.artifact_id);
                let problems = check_artifacts(&pom, "dependency", *required, items, found);
                artifact_outcome("dependency", *required, self.require_all, problems)
            }
            Kind::Plugins { required, items } => {
                let found = |r: &Requirement| pom.plugin_version(&r.group_id, &r.artifact_id);
                let problems = check_artifacts(&pom, "plugin", *required, items, found);
                artifact_outcome("plugin", *required, self.require_all, problems)
            }
            Kind::Properties { required, items } => {
                check_properties(&pom, *required, self.require_all, items)
            }
            Kind::Parent {
                group_id,
                artifact_id,
                version,
            } => check_parent(&pom, group_id, artifact_id, version.as_ref()),
        }
    }
}

/// Problems per requirement, in declaration order.
fn check_artifacts(
    pom: &PomModel,
    noun: &str,
    required: bool,
    items: &[Requirement],
    lookup: impl Fn(&Requirement) -> Option<Option<String>>,
) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|item| {
            let label = item.label();
            let declared = lookup(item);
            let version = declared.clone().flatten().map(|v| pom.resolve(&v));
            let mut problems = Vec::new();

            if !required {
                let forbidden = match (&declared, &item.version) {
                    (None, _) => false,
                    (Some(_), None) => true,
                    (Some(_), Some(v)) => version.as_deref() == Some(v.as_str()),
                };
                if forbidden {
                    problems.push(format!("Forbidden {noun} found: {label}"));
                }
                return problems;
            }

            if declared.is_none() {
                problems.push(format!("Required {noun} not found: {label}"));
                return problems;
            }
            if let Some(expected) = &item.version {
                if version.as_deref() != Some(expected.as_str()) {
                    problems.push(format!(
                        "{} {label} has version '{}', expected '{expected}'",
                        capitalize(noun),
                        version.as_deref().unwrap_or("none")
                    ));
                }
            }
            if let Some(minimum) = &item.min_version {
                match version.as_deref() {
                    Some(actual) if version::is_at_least(actual, minimum) => {}
                    actual => problems.push(format!(
                        "{} {label} version '{}' is lower than required minimum '{minimum}'",
                        capitalize(noun),
                        actual.unwrap_or("none")
                    )),
                }
            }
            problems
        })
        .collect()
}

fn artifact_outcome(
    noun: &str,
    required: bool,
    require_all: bool,
    per_item: Vec<Vec<String>>,
) -> Outcome {
    let (heading, ok) = if required {
        (
            format!("Required {noun} validation failed:"),
            format!("All required {noun} entries present"),
        )
    } else {
        (
            format!("Forbidden {noun} validation failed:"),
            format!("No forbidden {noun} entries found"),
        )
    };
    let problems = aggregate(required, require_all, per_item);
    Outcome::from_problems(&heading, &problems, ok)
}

/// Required checks with `requireAll` off pass once any single criterion holds.
fn aggregate(required: bool, require_all: bool, per_item: Vec<Vec<String>>) -> Vec<String> {
    if required && !require_all && per_item.iter().any(Vec::is_empty) {
        return Vec::new();
    }
    per_item.into_iter().flatten().collect()
}

fn check_properties(
    pom: &PomModel,
    required: bool,
    require_all: bool,
    items: &[(String, Option<String>)],
) -> Outcome {
    let mut per_item = Vec::new();
    for (name, expected) in items {
        let mut problems = Vec::new();
        let actual = pom.property(name).map(str::to_string).or_else(|| {
            (name == MULE_PLUGIN_VERSION_PROPERTY)
                .then(|| pom.find_plugin(MULE_PLUGIN_GROUP, MULE_PLUGIN_ARTIFACT))
                .flatten()
                .and_then(|p| p.configuration_version.clone())
        });

        match (required, actual, expected) {
            (true, None, _) => problems.push(format!("Required property not found: {name}")),
            (true, Some(actual), Some(expected)) if actual.trim() != expected => {
                problems.push(format!(
                    "Property '{name}' has incorrect value. Expected: '{expected}', Found: '{}'",
                    actual.trim()
                ))
            }
            (false, Some(actual), expected) => {
                if expected.as_deref().is_none_or(|e| e == actual.trim()) {
                    problems.push(format!("Forbidden property found: {name}"));
                }
            }
            _ => {}
        }
        per_item.push(problems);
    }

    let problems = aggregate(required, require_all, per_item);
    let (heading, ok) = if required {
        ("Required property validation failed:", "All required properties present")
    } else {
        ("Forbidden property validation failed:", "No forbidden properties found")
    };
    Outcome::from_problems(heading, &problems, ok)
}

fn check_parent(
    pom: &PomModel,
    group_id: &str,
    artifact_id: &str,
    version: Option<&VersionMatch>,
) -> Outcome {
    let Some(parent) = &pom.parent else {
        return Outcome::fail(format!(
            "Parent POM not declared. Expected: {group_id}:{artifact_id}"
        ));
    };

    let mut problems = Vec::new();
    if !parent.is(group_id, artifact_id) {
        problems.push(format!(
            "Parent mismatch. Expected: '{group_id}:{artifact_id}', Found: '{parent}'"
        ));
    }
    if let Some(expected) = version {
        let actual = parent.version.as_deref().map(|v| pom.resolve(v));
        if !actual.as_deref().is_some_and(|a| expected.is_match(a)) {
            problems.push(format!(
                "Parent version mismatch. Expected: '{}', Found: '{}'",
                expected.describe(),
                actual.as_deref().unwrap_or("none")
            ));
        }
    }
    Outcome::from_problems(
        "Parent validation failed:",
        &problems,
        format!("Parent is {}", describe_parent(parent)),
    )
}

fn describe_parent(parent: &Coordinate) -> String {
    match &parent.version {
        Some(v) => format!("{parent}:{v}"),
        None => parent.to_string(),
    }
}

/// `*` matches any run of characters; everything else is literal.
fn wildcard_regex(pattern: &str) -> Result<Regex, DispatchError> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$"))
        .map_err(|e| DispatchError::invalid("versionPattern", e.to_string()))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
