use super::Outcome;
use super::utils::{self, scalar_text};
use crate::context::Project;
use crate::dispatch::DispatchError;
use crate::select::PathSelector;
use crate::version;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForbiddenFieldValue {
    field: String,
    #[serde(deserialize_with = "utils::optional_scalar")]
    forbidden_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ForbiddenValues {
    List(Vec<ForbiddenFieldValue>),
    Map(Map<String, Value>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Params {
    file_pattern: Option<String>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    file_patterns: Vec<String>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    exclude_patterns: Vec<String>,
    #[serde(default)]
    required_fields: Map<String, Value>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    required_elements: Vec<String>,
    #[serde(default)]
    min_versions: Map<String, Value>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    forbidden_elements: Vec<String>,
    forbidden_field_values: Option<ForbiddenValues>,
    #[serde(default = "utils::default_true")]
    require_all: bool,
}

/// Top-level field rules over JSON documents such as `mule-artifact.json`.
#[derive(Clone, Debug)]
pub struct JsonValidation {
    selector: PathSelector,
    required_fields: Vec<(String, String)>,
    required_elements: Vec<String>,
    min_versions: Vec<(String, String)>,
    forbidden_elements: Vec<String>,
    forbidden_values: Vec<(String, String)>,
    require_all: bool,
}

impl JsonValidation {
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, DispatchError> {
        let p: Params = utils::parse_params(params)?;

        let mut patterns = p.file_patterns;
        if let Some(single) = p.file_pattern {
            patterns.insert(0, single);
        }
        utils::require_non_empty("filePattern", &patterns)?;
        let selector = PathSelector::new(&patterns, &p.exclude_patterns)
            .map_err(|e| DispatchError::invalid("filePattern", e.to_string()))?;

        let pairs = |map: Map<String, Value>| -> Vec<(String, String)> {
            map.into_iter().map(|(k, v)| (k, scalar_text(&v))).collect()
        };
        let forbidden_values = match p.forbidden_field_values {
            None => Vec::new(),
            Some(ForbiddenValues::Map(map)) => pairs(map),
            Some(ForbiddenValues::List(items)) => items
                .into_iter()
                .map(|item| {
                    let value = utils::require("forbiddenValue", item.forbidden_value)?;
                    Ok((item.field, value))
                })
                .collect::<Result<_, DispatchError>>()?,
        };

        let check = Self {
            selector,
            required_fields: pairs(p.required_fields),
            required_elements: p.required_elements,
            min_versions: pairs(p.min_versions),
            forbidden_elements: p.forbidden_elements,
            forbidden_values,
            require_all: p.require_all,
        };
        if !check.has_required_criteria()
            && check.forbidden_elements.is_empty()
            && check.forbidden_values.is_empty()
        {
            return Err(DispatchError::invalid(
                "requiredFields",
                "at least one of requiredFields, requiredElements, minVersions, forbiddenElements or forbiddenFieldValues is required",
            ));
        }
        Ok(check)
    }

    fn has_required_criteria(&self) -> bool {
        self.required_criteria() > 0
    }

    fn required_criteria(&self) -> usize {
        self.required_fields.len() + self.required_elements.len() + self.min_versions.len()
    }

    pub fn run(&self, project: &Project) -> Outcome {
        let files = self.selector.select(project.root());
        if files.is_empty() {
            let message = format!(
                "No files found matching pattern: {}",
                self.selector.describe()
            );
            return if self.has_required_criteria() {
                Outcome::fail(message)
            } else {
                Outcome::pass(format!("{message} (nothing to validate)"))
            };
        }

        let mut problems = Vec::new();
        for file in &files {
            let rel = &file.rel;
            let parsed = std::fs::read_to_string(&file.abs)
                .map_err(|e| e.to_string())
                .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));
            let document = match parsed {
                Ok(v) => v,
                Err(err) => {
                    tracing::warn!(path = %file.abs, error = %err, "could not parse JSON file");
                    problems.push(format!("Error parsing JSON file {rel}: {err}"));
                    continue;
                }
            };
            let field = |name: &str| document.get(name).filter(|v| !v.is_null());

            // One entry at most per required criterion.
            let mut missing = Vec::new();
            for (name, minimum) in &self.min_versions {
                match field(name) {
                    None => missing.push(format!("Field '{name}' missing in {rel}")),
                    Some(v) => {
                        let actual = scalar_text(v);
                        if !version::is_at_least(&actual, minimum) {
                            missing.push(format!(
                                "Field '{name}' version too low in {rel}: expected >= {minimum}, got {actual}"
                            ));
                        }
                    }
                }
            }
            for (name, expected) in &self.required_fields {
                match field(name) {
                    None => missing.push(format!("Field '{name}' missing in {rel}")),
                    Some(v) => {
                        let actual = scalar_text(v);
                        if &actual != expected {
                            missing.push(format!(
                                "Field '{name}' has wrong value in {rel}: expected '{expected}', got '{actual}'"
                            ));
                        }
                    }
                }
            }
            for name in &self.required_elements {
                if document.get(name).is_none() {
                    missing.push(format!("Element '{name}' missing in {rel}"));
                }
            }
            if self.require_all || missing.len() == self.required_criteria() {
                problems.append(&mut missing);
            }

            for name in &self.forbidden_elements {
                if document.get(name).is_some() {
                    problems.push(format!("Forbidden field '{name}' present in {rel}"));
                }
            }
            for (name, forbidden) in &self.forbidden_values {
                if field(name).is_some_and(|v| &scalar_text(v) == forbidden) {
                    problems.push(format!(
                        "Forbidden value '{forbidden}' found for field '{name}' in {rel}"
                    ));
                }
            }
        }

        Outcome::from_problems(
            "JSON validation failures:",
            &problems,
            format!("All JSON checks passed in {} file(s)", files.len()),
        )
    }
}
