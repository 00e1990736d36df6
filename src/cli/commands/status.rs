//! `tokn status [--expiring]`

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use comfy_table::Cell;
use console::style;

use crate::cli::context::AppContext;
use crate::cli::display::{list_table, output, render_list, status_color, status_icon, CommandOutput};
use crate::domain::models::{CredentialRecord, CredentialStatus};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only show credentials that are expiring soon or expired
    #[arg(short, long)]
    pub expiring: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct StatusRow {
    pub name: String,
    pub service: String,
    pub rotation_type: String,
    pub status: CredentialStatus,
    pub days_until_expiry: Option<i64>,
    pub last_rotated: Option<DateTime<Utc>>,
}

impl From<&CredentialRecord> for StatusRow {
    fn from(record: &CredentialRecord) -> Self {
        Self {
            name: record.name.clone(),
            service: record.service.clone(),
            rotation_type: record.rotation_type.as_str().to_string(),
            status: record.status(),
            days_until_expiry: record.days_until_expiry(),
            last_rotated: record.last_rotated,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct StatusOutput {
    /// Credentials in the registry, before filtering
    pub tracked: usize,
    pub expiring_only: bool,
    pub credentials: Vec<StatusRow>,
    pub last_sync: Option<DateTime<Utc>>,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        if self.tracked == 0 {
            return format!(
                "{} {} {}",
                style("No credentials tracked yet. Use").yellow(),
                style("tokn track").cyan(),
                style("to get started.").yellow()
            );
        }
        if self.expiring_only && self.credentials.is_empty() {
            return "No credentials are expiring soon.".to_string();
        }

        let mut table = list_table(&["Name", "Service", "Type", "Status", "Expires", "Last Rotated"]);
        let colors = console::colors_enabled();

        for row in &self.credentials {
            let status_text = format!("{} {}", status_icon(row.status), row.status);
            let status_cell = if colors {
                Cell::new(status_text).fg(status_color(row.status))
            } else {
                Cell::new(status_text)
            };
            let expires = row
                .days_until_expiry
                .map_or_else(|| "N/A".to_string(), |days| format!("{days} days"));
            let last_rotated = row
                .last_rotated
                .map_or_else(|| "Never".to_string(), |at| at.format("%Y-%m-%d").to_string());

            table.add_row(vec![
                Cell::new(&row.name),
                Cell::new(&row.service),
                Cell::new(&row.rotation_type),
                status_cell,
                Cell::new(expires),
                Cell::new(last_rotated),
            ]);
        }

        let mut rendered = render_list("credential", &table, self.credentials.len());
        if let Some(last_sync) = self.last_sync {
            rendered.push_str(&format!(
                "\n\n{}",
                style(format!("Last sync: {}", last_sync.format("%Y-%m-%d %H:%M:%S"))).dim()
            ));
        }
        rendered
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: StatusArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let service = ctx.credential_service()?;
    let (records, registry) = service.list(args.expiring).await?;

    let out = StatusOutput {
        tracked: registry.len(),
        expiring_only: args.expiring,
        credentials: records.iter().map(StatusRow::from).collect(),
        last_sync: registry.last_sync,
    };
    output(&out, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CredentialLocation, RotationType};
    use chrono::Duration;

    fn row(name: &str, days: i64) -> StatusRow {
        let record = CredentialRecord::new(
            name,
            "github",
            RotationType::Manual,
            vec![CredentialLocation::new("git-credentials", "~/.git-credentials")],
        )
        .with_expiry(Utc::now() + Duration::days(days) + Duration::hours(1));
        StatusRow::from(&record)
    }

    #[test]
    fn test_empty_registry_hint() {
        console::set_colors_enabled(false);
        let out = StatusOutput {
            tracked: 0,
            expiring_only: false,
            credentials: vec![],
            last_sync: None,
        };
        assert!(out.to_human().contains("tokn track"));
    }

    #[test]
    fn test_table_rows() {
        console::set_colors_enabled(false);
        let out = StatusOutput {
            tracked: 2,
            expiring_only: false,
            credentials: vec![row("gh-token", 3), row("gh-ci", 60)],
            last_sync: None,
        };
        let human = out.to_human();
        assert!(human.starts_with("2 credentials:"));
        assert!(human.contains("expiring_soon"));
        assert!(human.contains("3 days"));
        assert!(human.contains("Never"));
    }

    #[test]
    fn test_nothing_expiring() {
        let out = StatusOutput {
            tracked: 4,
            expiring_only: true,
            credentials: vec![],
            last_sync: None,
        };
        assert_eq!(out.to_human(), "No credentials are expiring soon.");
    }
}
