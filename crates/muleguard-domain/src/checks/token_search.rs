use super::Outcome;
use super::utils::{self, bullets};
use crate::context::Project;
use crate::dispatch::DispatchError;
use crate::select::PathSelector;
use crate::token::{MatchMode, TokenMatcher};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchMode {
    Required,
    #[default]
    Forbidden,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Params {
    #[serde(default, deserialize_with = "utils::string_or_list")]
    file_patterns: Vec<String>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    exclude_patterns: Vec<String>,
    #[serde(default, deserialize_with = "utils::string_or_list")]
    tokens: Vec<String>,
    #[serde(default)]
    search_mode: SearchMode,
    #[serde(default)]
    match_mode: MatchMode,
    element_name: Option<String>,
    #[serde(default = "utils::default_true")]
    case_sensitive: bool,
    #[serde(default = "utils::default_true")]
    require_all: bool,
}

/// Required or forbidden tokens across a glob-selected file set.
#[derive(Clone, Debug)]
pub struct TokenSearch {
    selector: PathSelector,
    matchers: Vec<TokenMatcher>,
    mode: SearchMode,
    require_all: bool,
}

impl TokenSearch {
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, DispatchError> {
        let p: Params = utils::parse_params(params)?;
        utils::require_non_empty("filePatterns", &p.file_patterns)?;
        utils::require_non_empty("tokens", &p.tokens)?;

        let element = match p.match_mode {
            MatchMode::ElementAttribute => Some(
                utils::require("elementName", p.element_name.as_deref())?,
            ),
            _ => None,
        };

        let selector = PathSelector::new(&p.file_patterns, &p.exclude_patterns)
            .map_err(|e| DispatchError::invalid("filePatterns", e.to_string()))?;
        let matchers = p
            .tokens
            .iter()
            .map(|t| TokenMatcher::new(t, p.match_mode, p.case_sensitive, element))
            .collect();

        Ok(Self {
            selector,
            matchers,
            mode: p.search_mode,
            require_all: p.require_all,
        })
    }

    pub fn run(&self, project: &Project) -> Outcome {
        let files = self.selector.select(project.root());
        if files.is_empty() {
            let message = format!(
                "No files found matching patterns: {}",
                self.selector.describe()
            );
            return match self.mode {
                SearchMode::Forbidden => Outcome::pass(message),
                SearchMode::Required => Outcome::fail(message),
            };
        }

        let mut found = vec![false; self.matchers.len()];
        let mut hits = Vec::new();
        let mut unreadable = Vec::new();

        for file in &files {
            let content = match std::fs::read_to_string(&file.abs) {
                Ok(c) => c,
                Err(err) => {
                    tracing::warn!(path = %file.abs, error = %err, "could not read file");
                    unreadable.push(format!("Could not read file {}: {err}", file.rel));
                    continue;
                }
            };
            for (i, matcher) in self.matchers.iter().enumerate() {
                if matcher.is_match(&content) {
                    found[i] = true;
                    hits.push(format!(
                        "Forbidden token '{}' found in file: {}",
                        matcher.token(),
                        file.rel
                    ));
                }
            }
        }

        match self.mode {
            SearchMode::Forbidden => {
                if hits.is_empty() {
                    let mut message =
                        format!("No forbidden tokens found in {} file(s)", files.len());
                    if !unreadable.is_empty() {
                        message.push_str(&format!(" (skipped: {})", unreadable.join("; ")));
                    }
                    Outcome::pass(message)
                } else {
                    Outcome::fail(bullets("Forbidden tokens found:", &hits))
                }
            }
            SearchMode::Required => {
                let missing: Vec<&str> = self
                    .matchers
                    .iter()
                    .zip(&found)
                    .filter(|(_, f)| !**f)
                    .map(|(m, _)| m.token())
                    .collect();
                let satisfied = if self.require_all {
                    missing.is_empty()
                } else {
                    found.iter().any(|f| *f)
                };

                let mut problems: Vec<String> = Vec::new();
                if !satisfied {
                    problems.extend(missing.iter().map(|t| {
                        format!(
                            "Required token '{t}' not found in files matching: {}",
                            self.selector.describe()
                        )
                    }));
                }
                problems.extend(unreadable);

                let present: Vec<&str> = self
                    .matchers
                    .iter()
                    .zip(&found)
                    .filter(|(_, f)| **f)
                    .map(|(m, _)| m.token())
                    .collect();
                Outcome::from_problems(
                    "Required tokens missing:",
                    &problems,
                    format!("Required token(s) found: '{}'", present.join("', '")),
                )
            }
        }
    }
}
