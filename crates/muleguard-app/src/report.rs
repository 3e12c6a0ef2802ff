//! Report envelope: the JSON document written for one `check` or `check-all` run.

use anyhow::Context;
use muleguard_types::ValidationReport;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const SCHEMA_REPORT_V1: &str = "muleguard.report.v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

impl ToolMeta {
    pub(crate) fn current() -> Self {
        Self {
            name: "muleguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Versioned outer shape around one or more project reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MuleguardReport {
    pub schema: String,
    pub tool: ToolMeta,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub projects: Vec<ValidationReport>,
}

impl MuleguardReport {
    pub(crate) fn finish(started_at: OffsetDateTime, projects: Vec<ValidationReport>) -> Self {
        Self {
            schema: SCHEMA_REPORT_V1.to_string(),
            tool: ToolMeta::current(),
            started_at,
            finished_at: OffsetDateTime::now_utc(),
            projects,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.projects.iter().any(ValidationReport::has_failures)
    }

    pub fn failed_rules(&self) -> usize {
        self.projects.iter().map(|p| p.failed.len()).sum()
    }
}

pub fn serialize_report(report: &MuleguardReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize muleguard report")
}

pub fn parse_report_json(text: &str) -> anyhow::Result<MuleguardReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;
    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unsupported report schema: {schema:?} (expected {SCHEMA_REPORT_V1})");
    }
    serde_json::from_value(value).context("parse muleguard report")
}

/// 0 when every evaluated rule passed, 2 when any rule failed.
pub fn exit_code(report: &MuleguardReport) -> i32 {
    if report.has_failures() { 2 } else { 0 }
}
