use crate::resolve::PropertyResolver;
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::OnceCell;

/// The project under evaluation. The property resolver is loaded on first use and shared by
/// every check of the evaluation.
#[derive(Debug)]
pub struct Project {
    root: Utf8PathBuf,
    resolver: OnceCell<PropertyResolver>,
}

impl Project {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            resolver: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn resolver(&self) -> &PropertyResolver {
        self.resolver
            .get_or_init(|| PropertyResolver::load(&self.root))
    }
}

/// Read-only per-rule evaluation context.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleContext<'a> {
    pub rule_id: &'a str,
    /// Global environments, present only for environment-scoped rules.
    pub environments: Option<&'a [String]>,
}
