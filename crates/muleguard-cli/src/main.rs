//! CLI entry point for muleguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `muleguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use muleguard_app::{
    CheckAllInput, CheckInput, MuleguardReport, exit_code, parse_report_json, render_markdown,
    run_check, run_check_all, serialize_report,
};
use muleguard_settings::{Overrides, ResolvedRuleSet};

#[derive(Parser, Debug)]
#[command(
    name = "muleguard",
    version,
    about = "Rule-driven compliance checks for Mule application projects"
)]
struct Cli {
    /// Path to the rule-set TOML.
    #[arg(long, default_value = "rules.toml")]
    rules: Utf8PathBuf,

    /// Override the configured environments (comma separated, e.g. dev,qa).
    #[arg(long, value_delimiter = ',')]
    environments: Option<Vec<String>>,

    /// Disable a rule by id for this run (repeatable).
    #[arg(long = "disable", value_name = "RULE_ID")]
    disabled_rules: Vec<String>,

    /// Log progress at info level.
    #[arg(long, short)]
    verbose: bool,

    /// Log every rule and check at debug level.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a single project and write the JSON report.
    Check {
        /// Project root (the folder holding pom.xml).
        #[arg(long)]
        project: Utf8PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Validate every project directly below a parent folder.
    CheckAll {
        /// Folder whose subdirectories are Mule or configuration projects.
        #[arg(long)]
        parent: Utf8PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "muleguard-reports/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Where to write the JSON report.
    #[arg(long, default_value = "muleguard-reports/report.json")]
    report_out: Utf8PathBuf,

    /// Also write a Markdown report to this path.
    #[arg(long)]
    markdown_out: Option<Utf8PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let result = match &cli.cmd {
        Commands::Check { project, output } => cmd_check(&cli, project, output),
        Commands::CheckAll { parent, output } => cmd_check_all(&cli, parent, output),
        Commands::Md { report, output } => cmd_md(report, output.as_deref()).map(|()| 0),
    };

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("muleguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

/// Initialize tracing/logging based on CLI flags; `RUST_LOG` wins when set.
fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    tracing::debug!("Logging initialized at level: {}", level);
}

fn load_rule_set(cli: &Cli) -> anyhow::Result<ResolvedRuleSet> {
    let text = std::fs::read_to_string(&cli.rules)
        .with_context(|| format!("read rules: {}", cli.rules))?;
    let rules = muleguard_settings::parse_rules_toml(&text)
        .with_context(|| format!("parse rules: {}", cli.rules))?;
    let overrides = Overrides {
        environments: cli.environments.clone(),
        disabled_rules: cli.disabled_rules.clone(),
    };
    let resolved =
        muleguard_settings::resolve_rule_set(rules, overrides).context("resolve rule set")?;
    tracing::info!(rules = resolved.rules.len(), path = %cli.rules, "rule set loaded");
    Ok(resolved)
}

fn cmd_check(cli: &Cli, project: &Utf8Path, output: &OutputArgs) -> anyhow::Result<i32> {
    let rule_set = load_rule_set(cli)?;
    let report = run_check(CheckInput {
        project_root: project,
        rule_set: &rule_set,
    });
    finish(&report, output)
}

fn cmd_check_all(cli: &Cli, parent: &Utf8Path, output: &OutputArgs) -> anyhow::Result<i32> {
    let rule_set = load_rule_set(cli)?;
    let report = run_check_all(CheckAllInput {
        parent,
        rule_set: &rule_set,
    })?;
    finish(&report, output)
}

fn finish(report: &MuleguardReport, output: &OutputArgs) -> anyhow::Result<i32> {
    write_report_file(&output.report_out, report).context("write report json")?;
    if let Some(path) = &output.markdown_out {
        write_text_file(path, &render_markdown(report)).context("write markdown")?;
    }

    for project in &report.projects {
        println!(
            "{}: {} passed, {} failed, {} skipped",
            project.project_path,
            project.passed.len(),
            project.failed.len(),
            project.skipped.len()
        );
    }
    Ok(exit_code(report))
}

fn write_report_file(path: &Utf8Path, report: &MuleguardReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    let data = serialize_report(report).context("serialize report")?;
    std::fs::write(path, data).with_context(|| format!("write report: {}", path))?;
    Ok(())
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, text).with_context(|| format!("write text: {}", path))?;
    Ok(())
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;
    let md = render_markdown(&report);

    if let Some(out_path) = output {
        write_text_file(out_path, &md).context("write markdown output")?;
    } else {
        print!("{}", md);
    }

    Ok(())
}
