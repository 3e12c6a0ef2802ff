use regex::{Regex, RegexBuilder};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchMode {
    #[default]
    Substring,
    Regex,
    ElementAttribute,
}

/// One token compiled for repeated matching against file contents.
#[derive(Clone, Debug)]
pub struct TokenMatcher {
    token: String,
    kind: Kind,
}

#[derive(Clone, Debug)]
enum Kind {
    Substring { needle: String, case_sensitive: bool },
    Pattern(Regex),
}

impl TokenMatcher {
    /// `element` is only consulted in [`MatchMode::ElementAttribute`]; without it that mode
    /// degrades to a substring search.
    pub fn new(token: &str, mode: MatchMode, case_sensitive: bool, element: Option<&str>) -> Self {
        let pattern = match (mode, element) {
            (MatchMode::Substring, _) | (MatchMode::ElementAttribute, None) => None,
            (MatchMode::Regex, _) => Some(token.to_string()),
            (MatchMode::ElementAttribute, Some(name)) => Some(element_pattern(name, token)),
        };

        let compiled = pattern.and_then(|p| {
            RegexBuilder::new(&p)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|err| {
                    tracing::debug!(token, error = %err, "invalid token pattern, using substring match");
                })
                .ok()
        });

        let kind = match compiled {
            Some(re) => Kind::Pattern(re),
            None => Kind::Substring {
                needle: if case_sensitive {
                    token.to_string()
                } else {
                    token.to_lowercase()
                },
                case_sensitive,
            },
        };

        Self {
            token: token.to_string(),
            kind,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_match(&self, content: &str) -> bool {
        match &self.kind {
            Kind::Substring {
                needle,
                case_sensitive: true,
            } => content.contains(needle.as_str()),
            Kind::Substring { needle, .. } => content.to_lowercase().contains(needle.as_str()),
            Kind::Pattern(re) => re.is_match(content),
        }
    }
}

/// Token inside the opening tag of `element`, with or without a namespace prefix.
fn element_pattern(element: &str, token: &str) -> String {
    format!(
        r"(?s)<(?:[a-zA-Z0-9_-]+:)?{}\b[^>]*?{}[^>]*?>",
        regex::escape(element),
        regex::escape(token)
    )
}
