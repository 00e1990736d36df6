//! Command-line interface for tokn.

pub mod commands;
pub mod context;
pub mod display;
pub mod types;

use console::style;
use thiserror::Error;

pub use context::AppContext;
pub use types::{Cli, Commands};

/// A command already printed its own failure report; only the exit status is left.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ReportedFailure(pub String);

/// Print `err` to stderr (as JSON in JSON mode) unless the command already
/// reported it.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) {
    if err.downcast_ref::<ReportedFailure>().is_some() {
        return;
    }

    if json_mode {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": causes,
        });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );
    } else {
        eprintln!("{} {err}", style("Error:").red().bold());
        for cause in err.chain().skip(1) {
            eprintln!("  {} {cause}", style("caused by:").dim());
        }
    }
}
