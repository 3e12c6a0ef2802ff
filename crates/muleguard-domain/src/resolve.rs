//! Placeholder resolution against a project's `.properties` files.

use crate::properties::Properties;
use crate::select::walk_files;
use camino::Utf8Path;
use std::collections::HashMap;

/// Directory, relative to the project root, whose `.properties` files feed the resolver.
pub const RESOURCES_DIR: &str = "src/main/resources";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Not a placeholder; the input as given.
    Literal(String),
    Resolved { key: String, value: String },
    Unresolved { key: String },
}

impl Resolution {
    /// The effective value, `None` when a placeholder could not be resolved.
    pub fn value(&self) -> Option<&str> {
        match self {
            Resolution::Literal(v) => Some(v),
            Resolution::Resolved { value, .. } => Some(value),
            Resolution::Unresolved { .. } => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PropertyResolver {
    values: HashMap<String, String>,
}

impl PropertyResolver {
    /// Loads every `*.properties` file under `<root>/src/main/resources` in walk order; a key
    /// defined in several files keeps the last value seen.
    pub fn load(root: &Utf8Path) -> Self {
        let dir = root.join(RESOURCES_DIR);
        let mut values = HashMap::new();
        if !dir.is_dir() {
            return Self { values };
        }

        for file in walk_files(&dir) {
            let is_properties = file
                .abs
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("properties"));
            if !is_properties {
                continue;
            }
            match std::fs::read_to_string(&file.abs) {
                Ok(text) => {
                    for (k, v) in Properties::parse(&text).iter() {
                        values.insert(k.to_string(), v.to_string());
                    }
                }
                Err(err) => {
                    tracing::warn!(path = %file.abs, error = %err, "skipping unreadable properties file");
                }
            }
        }

        tracing::debug!(root = %root, keys = values.len(), "loaded project properties");
        Self { values }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn resolve(&self, raw: &str) -> Resolution {
        match placeholder_key(raw) {
            None => Resolution::Literal(raw.to_string()),
            Some(key) => match self.values.get(key) {
                Some(value) => Resolution::Resolved {
                    key: key.to_string(),
                    value: value.clone(),
                },
                None => Resolution::Unresolved {
                    key: key.to_string(),
                },
            },
        }
    }
}

/// The key named by a whole-value placeholder: `${key}` or `#[p('key')]` (single or double
/// quotes, which must pair up, and optional whitespace). Surrounding whitespace is ignored.
pub fn placeholder_key(raw: &str) -> Option<&str> {
    let s = raw.trim();
    if let Some(inner) = s.strip_prefix("${").and_then(|r| r.strip_suffix('}')) {
        return (!inner.is_empty() && !inner.contains('}')).then_some(inner);
    }

    let inner = s.strip_prefix("#[")?.strip_suffix(']')?.trim();
    let args = inner.strip_prefix('p')?.trim_start();
    let quoted = args.strip_prefix('(')?.strip_suffix(')')?.trim();
    let mut chars = quoted.chars();
    let open = chars.next()?;
    let close = chars.next_back()?;
    if !matches!(open, '\'' | '"') || close != open {
        return None;
    }
    let key = &quoted[1..quoted.len() - 1];
    (!key.is_empty() && !key.contains(['\'', '"'])).then_some(key)
}
