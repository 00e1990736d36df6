//! `tokn rotate [NAME] [--all] [--include-manual] [--dry-run]`

use anyhow::Result;
use clap::Args;
use console::style;

use crate::cli::context::AppContext;
use crate::cli::display::{
    action_failure, action_success, action_warning, create_spinner, output, section_header,
    CommandOutput,
};
use crate::cli::ReportedFailure;
use crate::domain::models::{BatchRotationReport, RotationReport, RotationType};

#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Credential to rotate
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub name: Option<String>,

    /// Rotate every tracked credential
    #[arg(short, long)]
    pub all: bool,

    /// With --all, attempt MANUAL credentials too instead of listing their instructions
    #[arg(long, requires = "all")]
    pub include_manual: bool,

    /// Show what would be rotated without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// How a single rotation ended, from the operator's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationVerdict {
    Rotated,
    /// A human has to rotate it; not an error
    ManualRequired,
    Failed,
}

#[derive(Debug, serde::Serialize)]
pub struct RotationOutput {
    pub name: String,
    pub dry_run: bool,
    pub verdict: RotationVerdict,
    pub message: String,
    pub locations: Vec<String>,
}

impl RotationOutput {
    fn new(name: String, dry_run: bool, manual: bool, report: RotationReport) -> Self {
        let verdict = if report.success {
            RotationVerdict::Rotated
        } else if manual || report.is_auto_rotation_unsupported() {
            RotationVerdict::ManualRequired
        } else {
            RotationVerdict::Failed
        };
        Self {
            name,
            dry_run,
            verdict,
            message: report.message,
            locations: report.locations,
        }
    }
}

impl CommandOutput for RotationOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.dry_run {
            lines.push(dry_run_banner());
        }
        match self.verdict {
            RotationVerdict::Rotated => {
                lines.push(action_success(&self.message));
                for location in &self.locations {
                    lines.push(format!("  {} {location}", style("\u{2192}").dim()));
                }
            }
            RotationVerdict::ManualRequired => {
                lines.push(action_warning(&format!("Manual rotation required: {}", self.name)));
                lines.push(style(&self.message).dim().to_string());
            }
            RotationVerdict::Failed => lines.push(action_failure(&self.message)),
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct BatchOutput {
    pub dry_run: bool,
    #[serde(flatten)]
    pub report: BatchRotationReport,
}

impl CommandOutput for BatchOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.dry_run {
            lines.push(dry_run_banner());
        }

        let report = &self.report;
        if report.total() == 0 {
            lines.push("No credentials tracked yet.".to_string());
            return lines.join("\n");
        }

        if !report.success.is_empty() {
            let title = if self.dry_run { "Would rotate:" } else { "Successfully rotated:" };
            lines.push(action_success(&style(title).green().bold().to_string()));
            for item in &report.success {
                lines.push(format!("  {} {}", style("\u{2022}").green(), style(&item.name).cyan()));
                for location in &item.locations {
                    lines.push(format!("    {} {location}", style("\u{2192}").dim()));
                }
            }
        }

        if !report.failed.is_empty() {
            lines.push(section_header("Failed to rotate:"));
            for item in &report.failed {
                lines.push(format!(
                    "  {} {}: {}",
                    style("\u{2022}").red(),
                    style(&item.name).cyan(),
                    style(&item.error).red()
                ));
            }
        }

        if !report.manual.is_empty() {
            lines.push(section_header("Manual rotation required:"));
            for item in &report.manual {
                lines.push(format!("  {} {}", style("\u{2022}").yellow(), style(&item.name).cyan()));
                lines.push(style(&item.instructions).dim().to_string());
            }
        }

        if !report.skipped.is_empty() {
            lines.push(section_header("Skipped:"));
            for item in &report.skipped {
                lines.push(format!("  {} {}: {}", style("\u{2022}").dim(), item.name, item.reason));
            }
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn dry_run_banner() -> String {
    format!(
        "{} - No changes will be made\n",
        style("DRY RUN MODE").yellow().bold()
    )
}

pub async fn execute(args: RotateArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let orchestrator = ctx.orchestrator()?;

    if args.all {
        let auto_only = !args.include_manual;
        let spinner = create_spinner("Rotating credentials...", json_mode);
        let report = if args.dry_run {
            orchestrator.plan_all(auto_only).await
        } else {
            orchestrator.rotate_all(auto_only).await
        };
        spinner.finish_and_clear();

        let out = BatchOutput {
            dry_run: args.dry_run,
            report: report?,
        };
        output(&out, json_mode);

        if out.report.has_failures() {
            return Err(ReportedFailure(format!(
                "{} credential(s) failed to rotate",
                out.report.failed.len()
            ))
            .into());
        }
        return Ok(());
    }

    let Some(name) = args.name else {
        anyhow::bail!("Specify --all or provide a credential name");
    };

    let record = ctx.credential_service()?.get(&name).await?;
    let report = if args.dry_run {
        orchestrator.plan_rotation(&record).await
    } else {
        orchestrator.rotate_credential(&record).await
    };

    let out = RotationOutput::new(
        name,
        args.dry_run,
        record.rotation_type == RotationType::Manual,
        report,
    );
    output(&out, json_mode);

    if out.verdict == RotationVerdict::Failed {
        return Err(ReportedFailure(out.message).into());
    }
    Ok(())
}
