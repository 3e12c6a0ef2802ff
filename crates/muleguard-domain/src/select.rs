//! Glob-based file selection over a project tree.
//!
//! Patterns are anchored to the full project-relative path (forward slashes). `**` spans any
//! number of segments, `*` and `?` stay within one segment, and every other character is
//! literal.

use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use muleguard_types::RepoPath;
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
#[error("invalid glob pattern `{pattern}`: {source}")]
pub struct SelectError {
    pub pattern: String,
    #[source]
    pub source: globset::Error,
}

/// A regular file found under the project root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub abs: Utf8PathBuf,
    pub rel: RepoPath,
}

#[derive(Clone, Debug)]
pub struct PathSelector {
    include: GlobSet,
    exclude: GlobSet,
    patterns: Vec<String>,
}

impl PathSelector {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, SelectError> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
            patterns: include.to_vec(),
        })
    }

    /// Inclusion patterns as configured, for messages.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn describe(&self) -> String {
        self.patterns.join(", ")
    }

    pub fn is_match(&self, rel: &str) -> bool {
        let rel = RepoPath::new(rel);
        self.include.is_match(rel.as_str()) && !self.exclude.is_match(rel.as_str())
    }

    /// Matching files under `root`, in deterministic walk order.
    pub fn select(&self, root: &Utf8Path) -> Vec<SelectedFile> {
        if self.include.is_empty() {
            return Vec::new();
        }
        walk_files(root)
            .into_iter()
            .filter(|f| self.is_match(f.rel.as_str()))
            .collect()
    }
}

/// Exclusion-only filter, used where file selection is not glob driven.
pub fn excluded_by(patterns: &[String]) -> Result<GlobSet, SelectError> {
    build_globset(patterns)
}

/// Every regular file under `root`, sorted by file name at each level. Unreadable entries and
/// non UTF-8 paths are logged and skipped.
pub fn walk_files(root: &Utf8Path) -> Vec<SelectedFile> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(root = %root, error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(abs) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
            tracing::warn!(root = %root, "skipping non UTF-8 path");
            continue;
        };
        let rel = RepoPath::relative(root, &abs);
        out.push(SelectedFile { abs, rel });
    }
    out
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, SelectError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let normalized = escape_literals(&RepoPath::new(pattern.trim()).to_string());
        let glob = GlobBuilder::new(&normalized)
            .literal_separator(true)
            .backslash_escape(false)
            .build()
            .map_err(|source| SelectError {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| SelectError {
        pattern: patterns.join(", "),
        source,
    })
}

/// Brackets and braces are literal in our pattern language.
fn escape_literals(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '[' | ']' | '{' | '}' => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            _ => out.push(c),
        }
    }
    out
}
