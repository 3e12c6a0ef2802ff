use super::Outcome;
use super::utils;
use crate::context::Project;
use crate::dispatch::DispatchError;
use crate::resolve::{PropertyResolver, Resolution};
use crate::select::PathSelector;
use crate::token::{MatchMode, TokenMatcher};
use crate::xml::{self, XPath};
use muleguard_types::RepoPath;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_PATH: &str = "src/main/mule/**/*.xml";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum XmlValidationType {
    Exists,
    NotExists,
    AttributeValue,
    AttributeExists,
    ForbiddenValue,
    ForbiddenAttribute,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Params {
    path: Option<String>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    file_patterns: Vec<String>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    exclude_patterns: Vec<String>,
    validation_type: Option<XmlValidationType>,
    xpath: Option<String>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    xpaths: Vec<String>,
    #[serde(default = "utils::default_true")]
    require_all: bool,
    failure_message: Option<String>,
    #[serde(default, deserialize_with = "utils::optional_scalar")]
    expected_value: Option<String>,
    #[serde(default)]
    property_resolution: bool,
    case_sensitive: Option<bool>,
    element_name: Option<String>,
    required_attribute: Option<String>,
    #[serde(default, deserialize_with = "utils::optional_scalar")]
    forbidden_value: Option<String>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    elements: Vec<String>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    attributes: Vec<String>,
}

#[derive(Clone, Debug)]
enum Validation {
    Exists {
        xpaths: Vec<XPath>,
        require_all: bool,
    },
    NotExists {
        xpaths: Vec<XPath>,
    },
    AttributeValue {
        xpath: XPath,
        expected: ExpectedValue,
    },
    AttributeExists {
        element: String,
        attribute: String,
        expected: Option<ExpectedValue>,
    },
    ForbiddenValue {
        element: String,
        matcher: TokenMatcher,
    },
    ForbiddenAttribute {
        elements: Vec<String>,
        attributes: Vec<String>,
    },
}

#[derive(Clone, Debug)]
struct ExpectedValue {
    value: String,
    property_resolution: bool,
    case_sensitive: bool,
}

impl ExpectedValue {
    /// A problem line when `raw` (as found in `rel`) does not satisfy the expectation.
    fn check(&self, raw: &str, rel: &RepoPath, project: &Project) -> Option<String> {
        let (actual, expected) = if self.property_resolution {
            let resolver: &PropertyResolver = project.resolver();
            let actual = match resolver.resolve(raw) {
                Resolution::Unresolved { .. } => {
                    return Some(format!("Property not found in {rel}. Placeholder: \"{raw}\""));
                }
                resolved => resolved.value().unwrap_or(raw).to_string(),
            };
            let expected = resolver
                .resolve(&self.value)
                .value()
                .unwrap_or(&self.value)
                .to_string();
            (actual, expected)
        } else {
            (raw.to_string(), self.value.clone())
        };

        if utils::eq_case(&actual, &expected, self.case_sensitive) {
            None
        } else {
            Some(format!(
                "Incorrect value in {rel}. Found: \"{actual}\", Expected: \"{expected}\""
            ))
        }
    }
}

/// XPath and element/attribute rules over XML files.
#[derive(Clone, Debug)]
pub struct XmlValidation {
    selector: PathSelector,
    validation: Validation,
    failure_message: Option<String>,
}

impl XmlValidation {
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, DispatchError> {
        let p: Params = utils::parse_params(params)?;
        let validation_type = utils::require("validationType", p.validation_type)?;

        let patterns = if p.file_patterns.is_empty() {
            vec![p.path.clone().unwrap_or_else(|| DEFAULT_PATH.to_string())]
        } else {
            p.file_patterns.clone()
        };
        let selector = PathSelector::new(&patterns, &p.exclude_patterns)
            .map_err(|e| DispatchError::invalid("path", e.to_string()))?;

        let case_sensitive = p.case_sensitive.unwrap_or(true);
        let validation = match validation_type {
            XmlValidationType::Exists | XmlValidationType::NotExists => {
                let mut sources: Vec<String> = p.xpath.iter().cloned().collect();
                sources.extend(p.xpaths.iter().cloned());
                utils::require_non_empty("xpath", &sources)?;
                let xpaths = sources
                    .iter()
                    .map(|s| compile_xpath("xpaths", s))
                    .collect::<Result<Vec<_>, _>>()?;
                if validation_type == XmlValidationType::Exists {
                    Validation::Exists {
                        xpaths,
                        require_all: p.require_all,
                    }
                } else {
                    Validation::NotExists { xpaths }
                }
            }
            XmlValidationType::AttributeValue => Validation::AttributeValue {
                xpath: compile_xpath("xpath", utils::require("xpath", p.xpath.as_deref())?)?,
                expected: ExpectedValue {
                    value: utils::require("expectedValue", p.expected_value.clone())?,
                    property_resolution: p.property_resolution,
                    case_sensitive,
                },
            },
            XmlValidationType::AttributeExists => Validation::AttributeExists {
                element: utils::require("elementName", p.element_name.clone())?,
                attribute: utils::require("requiredAttribute", p.required_attribute.clone())?,
                expected: p.expected_value.clone().map(|value| ExpectedValue {
                    value,
                    property_resolution: p.property_resolution,
                    case_sensitive,
                }),
            },
            XmlValidationType::ForbiddenValue => {
                let element = utils::require("elementName", p.element_name.clone())?;
                let value = utils::require("forbiddenValue", p.forbidden_value.as_deref())?;
                let matcher = TokenMatcher::new(
                    value,
                    MatchMode::ElementAttribute,
                    p.case_sensitive.unwrap_or(false),
                    Some(element.as_str()),
                );
                Validation::ForbiddenValue { element, matcher }
            }
            XmlValidationType::ForbiddenAttribute => {
                utils::require_non_empty("elements", &p.elements)?;
                utils::require_non_empty("attributes", &p.attributes)?;
                Validation::ForbiddenAttribute {
                    elements: p.elements.clone(),
                    attributes: p.attributes.clone(),
                }
            }
        };

        Ok(Self {
            selector,
            validation,
            failure_message: p.failure_message,
        })
    }

    pub fn run(&self, project: &Project) -> Outcome {
        let files = self.selector.select(project.root());
        if files.is_empty() {
            let message = format!("No XML files found matching: {}", self.selector.describe());
            return match self.validation {
                Validation::Exists { .. } => Outcome::fail(message),
                _ => Outcome::pass(message),
            };
        }

        let mut problems: Vec<String> = Vec::new();
        let mut found = match &self.validation {
            Validation::Exists { xpaths, .. } => vec![false; xpaths.len()],
            _ => Vec::new(),
        };
        let mut applicable = 0usize;

        for file in &files {
            let rel = &file.rel;
            let text = match std::fs::read_to_string(&file.abs) {
                Ok(t) => t,
                Err(err) => {
                    tracing::warn!(path = %file.abs, error = %err, "could not read XML file");
                    problems.push(format!("Error reading XML file {rel}: {err}"));
                    continue;
                }
            };

            if let Validation::ForbiddenValue { element, matcher } = &self.validation {
                if matcher.is_match(&text) {
                    problems.push(format!(
                        "Forbidden value '{}' found in <{element}> in {rel}",
                        matcher.token()
                    ));
                }
                continue;
            }

            let doc = match xml::parse(&text) {
                Ok(d) => d,
                Err(err) => {
                    tracing::warn!(path = %file.abs, error = %err, "could not parse XML file");
                    problems.push(format!("Error parsing XML file {rel}: {err}"));
                    continue;
                }
            };

            match &self.validation {
                Validation::Exists { xpaths, .. } => {
                    for (i, xp) in xpaths.iter().enumerate() {
                        match xp.matches(&doc) {
                            Ok(true) => found[i] = true,
                            Ok(false) => {}
                            Err(err) => problems.push(xpath_error(xp, rel, &err)),
                        }
                    }
                }
                Validation::NotExists { xpaths } => {
                    for xp in xpaths {
                        match xp.matches(&doc) {
                            Ok(true) => problems.push(format!(
                                "Forbidden XPath '{}' matched in {rel}",
                                xp.as_str()
                            )),
                            Ok(false) => {}
                            Err(err) => problems.push(xpath_error(xp, rel, &err)),
                        }
                    }
                }
                Validation::AttributeValue { xpath, expected } => match xpath.select(&doc) {
                    Ok(nodes) => {
                        for node in nodes {
                            applicable += 1;
                            let value = node.string_value();
                            if let Some(problem) = expected.check(&value, rel, project) {
                                problems.push(problem);
                            }
                        }
                    }
                    Err(err) => problems.push(xpath_error(xpath, rel, &err)),
                },
                Validation::AttributeExists {
                    element,
                    attribute,
                    expected,
                } => {
                    for node in xml::elements_named(&doc, element) {
                        applicable += 1;
                        match (xml::attribute_value(node, attribute), expected) {
                            (None, _) => problems.push(format!(
                                "Element <{element}> is missing attribute '{attribute}' in {rel}"
                            )),
                            (Some(value), Some(exp)) => {
                                if let Some(problem) = exp.check(value, rel, project) {
                                    problems.push(problem);
                                }
                            }
                            (Some(_), None) => {}
                        }
                    }
                }
                Validation::ForbiddenAttribute {
                    elements,
                    attributes,
                } => {
                    let mut offending = Vec::new();
                    for element in elements {
                        for node in xml::elements_named(&doc, element) {
                            for attribute in attributes {
                                if xml::attribute_value(node, attribute).is_some() {
                                    offending.push(format!("'{attribute}' in <{element}>"));
                                }
                            }
                        }
                    }
                    if !offending.is_empty() {
                        problems.push(format!("{rel}: {}", offending.join(", ")));
                    }
                }
                Validation::ForbiddenValue { .. } => {}
            }
        }

        if let Validation::Exists { xpaths, require_all } = &self.validation {
            let missing: Vec<&XPath> = xpaths
                .iter()
                .zip(&found)
                .filter(|(_, f)| !**f)
                .map(|(x, _)| x)
                .collect();
            let satisfied = if *require_all {
                missing.is_empty()
            } else {
                found.iter().any(|f| *f)
            };
            if !satisfied {
                problems.extend(missing.iter().map(|x| {
                    format!(
                        "Required XPath '{}' not found in files matching: {}",
                        x.as_str(),
                        self.selector.describe()
                    )
                }));
            }
        }

        let heading = self
            .failure_message
            .clone()
            .unwrap_or_else(|| self.heading().to_string());
        let ok = match &self.validation {
            Validation::AttributeValue { xpath, .. } if applicable == 0 => format!(
                "No nodes selected by '{}'; not applicable",
                xpath.as_str()
            ),
            Validation::AttributeExists { element, .. } if applicable == 0 => {
                format!("No <{element}> elements found; not applicable")
            }
            _ => format!("XML validation passed for {} file(s)", files.len()),
        };
        Outcome::from_problems(&heading, &problems, ok)
    }

    fn heading(&self) -> &'static str {
        match self.validation {
            Validation::Exists { .. } => "Required XML content missing:",
            Validation::NotExists { .. } => "Forbidden XML content found:",
            Validation::AttributeValue { .. } => "Attribute value validation failed:",
            Validation::AttributeExists { .. } => "Required attribute validation failed:",
            Validation::ForbiddenValue { .. } => "Forbidden values found:",
            Validation::ForbiddenAttribute { .. } => "Forbidden attributes found:",
        }
    }
}

fn compile_xpath(key: &str, source: &str) -> Result<XPath, DispatchError> {
    XPath::parse(source).map_err(|e| DispatchError::invalid(key, format!("'{source}': {e}")))
}

fn xpath_error(xpath: &XPath, rel: &RepoPath, err: &xml::XPathError) -> String {
    format!("Error evaluating XPath '{}' in {rel}: {err}", xpath.as_str())
}
