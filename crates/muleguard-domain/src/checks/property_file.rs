use super::Outcome;
use super::utils::{self, contains_case, eq_case};
use crate::context::{Project, RuleContext};
use crate::dispatch::DispatchError;
use crate::properties::{self, Properties};
use crate::select::{self, SelectedFile};
use globset::GlobSet;
use muleguard_types::PropertyConfig;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseMode {
    #[default]
    PropertiesFormat,
    SubstringSearch,
    RegexPattern,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Params {
    #[serde(default, deserialize_with = "utils::string_or_list")]
    file_extensions: Vec<String>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    environments: Vec<String>,
    #[serde(default)]
    parse_mode: ParseMode,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    property_names: Vec<String>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    regex_patterns: Vec<String>,
    #[serde(default)]
    properties: Vec<PropertyConfig>,
    #[serde(default = "utils::default_true")]
    case_sensitive_names: bool,
    #[serde(default = "utils::default_true")]
    case_sensitive_values: bool,
    #[serde(default = "utils::default_true")]
    case_sensitive: bool,
    #[serde(default = "default_delimiter")]
    delimiter: String,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    exclude_patterns: Vec<String>,
    #[serde(default = "utils::default_true")]
    require_all: bool,
}

fn default_delimiter() -> String {
    "=".to_string()
}

#[derive(Clone, Debug)]
struct LinePattern {
    source: String,
    name: Regex,
    value: Regex,
}

#[derive(Clone, Debug)]
enum Mode {
    PropertiesFormat {
        names: Vec<String>,
        properties: Vec<PropertyConfig>,
    },
    SubstringSearch {
        needles: Vec<String>,
    },
    RegexPattern {
        patterns: Vec<LinePattern>,
    },
}

/// Key presence, value and line-pattern rules over environment property files.
#[derive(Clone, Debug)]
pub struct PropertyFileCheck {
    extensions: Vec<String>,
    environments: Vec<String>,
    exclude: GlobSet,
    mode: Mode,
    case_sensitive_names: bool,
    case_sensitive_values: bool,
    case_sensitive: bool,
    delimiter: String,
    require_all: bool,
}

impl PropertyFileCheck {
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, DispatchError> {
        let p: Params = utils::parse_params(params)?;
        utils::require_non_empty("fileExtensions", &p.file_extensions)?;
        if p.delimiter.is_empty() {
            return Err(DispatchError::invalid("delimiter", "must not be empty"));
        }

        let mode = match p.parse_mode {
            ParseMode::PropertiesFormat => {
                if p.property_names.is_empty() && p.properties.is_empty() {
                    return Err(DispatchError::invalid(
                        "propertyNames",
                        "propertyNames or properties is required",
                    ));
                }
                Mode::PropertiesFormat {
                    names: p.property_names,
                    properties: p.properties,
                }
            }
            ParseMode::SubstringSearch => {
                utils::require_non_empty("propertyNames", &p.property_names)?;
                Mode::SubstringSearch {
                    needles: p.property_names,
                }
            }
            ParseMode::RegexPattern => {
                utils::require_non_empty("regexPatterns", &p.regex_patterns)?;
                let patterns = p
                    .regex_patterns
                    .iter()
                    .map(|s| {
                        line_pattern(
                            s,
                            &p.delimiter,
                            p.case_sensitive_names,
                            p.case_sensitive_values,
                        )
                    })
                    .collect::<Result<_, _>>()?;
                Mode::RegexPattern { patterns }
            }
        };

        let exclude = select::excluded_by(&p.exclude_patterns)
            .map_err(|e| DispatchError::invalid("excludePatterns", e.to_string()))?;

        Ok(Self {
            extensions: p.file_extensions.iter().map(|e| normalize_extension(e)).collect(),
            environments: p.environments,
            exclude,
            mode,
            case_sensitive_names: p.case_sensitive_names,
            case_sensitive_values: p.case_sensitive_values,
            case_sensitive: p.case_sensitive,
            delimiter: p.delimiter,
            require_all: p.require_all,
        })
    }

    pub fn run(&self, project: &Project, ctx: &RuleContext<'_>) -> Outcome {
        let environments: &[String] = if self.environments.is_empty() {
            ctx.environments.unwrap_or(&[])
        } else {
            &self.environments
        };
        if environments.is_empty() {
            return Outcome::fail(
                "Configuration error: no environments configured for property file validation",
            );
        }

        let files: Vec<SelectedFile> = select::walk_files(project.root())
            .into_iter()
            .filter(|f| !self.exclude.is_match(f.rel.as_str()))
            .filter(|f| self.is_environment_file(f.rel.file_name(), environments))
            .collect();

        if files.is_empty() {
            return Outcome::fail(format!(
                "No property files found for environments [{}] with extensions [{}]",
                environments.join(", "),
                self.extensions.join(", ")
            ));
        }

        let mut problems = Vec::new();
        for file in &files {
            match std::fs::read_to_string(&file.abs) {
                Ok(text) => self.check_file(&text, file, &mut problems),
                Err(err) => {
                    tracing::warn!(path = %file.abs, error = %err, "could not read property file");
                    problems.push(format!("Error reading file {}: {err}", file.rel));
                }
            }
        }

        Outcome::from_problems(
            "Validation failures:",
            &problems,
            format!("All property checks passed in {} file(s)", files.len()),
        )
    }

    fn is_environment_file(&self, file_name: &str, environments: &[String]) -> bool {
        let Some(dot) = file_name.rfind('.') else {
            return false;
        };
        let (base, ext) = file_name.split_at(dot);
        environments.iter().any(|e| e == base)
            && self.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext))
    }

    /// Each criterion contributes at most one problem per file. With `requireAll` off a file
    /// passes as soon as one criterion holds.
    fn check_file(&self, text: &str, file: &SelectedFile, problems: &mut Vec<String>) {
        let before = problems.len();
        self.check_criteria(text, file, problems);
        if !self.require_all && problems.len() - before < self.criteria() {
            problems.truncate(before);
        }
    }

    fn criteria(&self) -> usize {
        match &self.mode {
            Mode::PropertiesFormat { names, properties } => names.len() + properties.len(),
            Mode::SubstringSearch { needles } => needles.len(),
            Mode::RegexPattern { patterns } => patterns.len(),
        }
    }

    fn check_criteria(&self, text: &str, file: &SelectedFile, problems: &mut Vec<String>) {
        let rel = &file.rel;
        match &self.mode {
            Mode::PropertiesFormat { names, properties } => {
                let parsed = if self.delimiter == "=" {
                    Properties::parse(text)
                } else {
                    Properties::parse_with_delimiter(text, &self.delimiter)
                };
                let lookup = |name: &str, case_sensitive: bool| {
                    if case_sensitive {
                        parsed.get(name)
                    } else {
                        parsed.get_ignore_case(name)
                    }
                };

                for name in names {
                    if lookup(name, self.case_sensitive_names).is_none() {
                        problems.push(format!("Property '{name}' not found in file: {rel}"));
                    }
                }
                for cfg in properties {
                    let name_cs = cfg.case_sensitive_name.unwrap_or(self.case_sensitive_names);
                    let value_cs = cfg.case_sensitive_value.unwrap_or(self.case_sensitive_values);
                    match lookup(&cfg.name, name_cs) {
                        None => problems
                            .push(format!("Property '{}' not found in file: {rel}", cfg.name)),
                        Some(value) => {
                            let allowed = cfg.values.is_empty()
                                || cfg.values.iter().any(|v| eq_case(value.trim(), v, value_cs));
                            if !allowed {
                                problems.push(format!(
                                    "Property '{}' found but value does not match expected values [{}] in file: {rel}",
                                    cfg.name,
                                    cfg.values.join(", ")
                                ));
                            }
                        }
                    }
                }
            }
            Mode::SubstringSearch { needles } => {
                for needle in needles {
                    if !contains_case(text, needle, self.case_sensitive) {
                        problems.push(format!("Property '{needle}' not found in file: {rel}"));
                    }
                }
            }
            Mode::RegexPattern { patterns } => {
                let lines: Vec<(&str, &str)> = text
                    .lines()
                    .map(str::trim)
                    .filter(|l| !properties::is_comment(l))
                    .filter_map(|l| l.split_once(self.delimiter.as_str()))
                    .map(|(k, v)| (k.trim(), v.trim()))
                    .collect();
                for pattern in patterns {
                    let matched = lines
                        .iter()
                        .any(|(k, v)| pattern.name.is_match(k) && pattern.value.is_match(v));
                    if !matched {
                        problems.push(format!(
                            "Pattern '{}' not matched in file: {rel}",
                            pattern.source
                        ));
                    }
                }
            }
        }
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

/// `namePattern=valuePattern`, split at the first delimiter; both halves must match in full.
fn line_pattern(
    source: &str,
    delimiter: &str,
    case_sensitive_names: bool,
    case_sensitive_values: bool,
) -> Result<LinePattern, DispatchError> {
    let (name, value) = source.split_once(delimiter).ok_or_else(|| {
        DispatchError::invalid(
            "regexPatterns",
            format!("'{source}' is not namePattern{delimiter}valuePattern"),
        )
    })?;
    let build = |p: &str, case_sensitive: bool| {
        RegexBuilder::new(&format!("^(?:{})$", p.trim()))
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| DispatchError::invalid("regexPatterns", format!("'{source}': {e}")))
    };
    Ok(LinePattern {
        source: source.to_string(),
        name: build(name, case_sensitive_names)?,
        value: build(value, case_sensitive_values)?,
    })
}
