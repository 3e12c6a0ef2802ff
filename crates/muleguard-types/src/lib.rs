//! Stable DTOs and IDs used across the muleguard workspace.
//!
//! This crate is intentionally boring:
//! - rule and check definitions as loaded from a rule set
//! - per-check, per-rule and per-project results
//! - stable check type identifiers (including legacy aliases)
//! - canonical project-relative path handling

#![forbid(unsafe_code)]

pub mod ids;
pub mod model;
pub mod path;
pub mod report;

pub use model::{Check, PropertyConfig, Rule};
pub use path::RepoPath;
pub use report::{CheckResult, RuleResult, ValidationReport};
