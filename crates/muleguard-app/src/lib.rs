//! Use case orchestration for muleguard.
//!
//! This crate provides the application layer: it resolves which rules apply to a project, runs
//! the domain engine over one or many projects, and wraps the results in a report envelope. It is
//! intentionally thin and delegates the checks themselves to `muleguard-domain`.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod check;
mod render;
mod report;

pub use check::{
    CheckAllInput, CheckInput, CompiledRuleSet, discover_projects, run_check, run_check_all,
    validate_project,
};
pub use render::render_markdown;
pub use report::{
    MuleguardReport, SCHEMA_REPORT_V1, ToolMeta, exit_code, parse_report_json, serialize_report,
};
