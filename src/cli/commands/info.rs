//! `tokn info NAME`

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::display::{colorize_status, output, CommandOutput, DetailView};
use crate::domain::models::{CredentialLocation, CredentialRecord, CredentialStatus};

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Credential name
    pub name: String,
}

/// Serializable view of a tracked credential.
#[derive(Debug, serde::Serialize)]
pub struct CredentialOutput {
    pub name: String,
    pub service: String,
    pub rotation_type: String,
    pub status: CredentialStatus,
    pub days_until_expiry: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_rotated: Option<DateTime<Utc>>,
    pub rotation_day: u8,
    pub locations: Vec<CredentialLocation>,
    pub notes: String,
}

impl From<&CredentialRecord> for CredentialOutput {
    fn from(record: &CredentialRecord) -> Self {
        Self {
            name: record.name.clone(),
            service: record.service.clone(),
            rotation_type: record.rotation_type.as_str().to_string(),
            status: record.status(),
            days_until_expiry: record.days_until_expiry(),
            expires_at: record.expires_at,
            last_rotated: record.last_rotated,
            rotation_day: record.rotation_day,
            locations: record.locations.clone(),
            notes: record.notes.clone(),
        }
    }
}

impl CommandOutput for CredentialOutput {
    fn to_human(&self) -> String {
        let expires = self.expires_at.map(|at| match self.days_until_expiry {
            Some(days) => format!("{} ({days} days)", at.format("%Y-%m-%d")),
            None => at.format("%Y-%m-%d").to_string(),
        });
        let last_rotated = self
            .last_rotated
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string());

        let mut view = DetailView::new(&self.name)
            .field("Service", &self.service)
            .field("Rotation Type", &self.rotation_type)
            .field("Status", &colorize_status(self.status).to_string())
            .field_opt("Expires", expires.as_deref())
            .field_opt("Last Rotated", last_rotated.as_deref())
            .field("Rotation Day", &self.rotation_day.to_string())
            .section("Locations");

        for location in &self.locations {
            view = view.item(&location.to_string());
            for (key, value) in &location.metadata {
                view = view.item(&format!("  {key}: {value}"));
            }
        }

        if !self.notes.is_empty() {
            view = view.section("Notes").item(&self.notes);
        }

        view.render()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InfoArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let service = ctx.credential_service()?;
    let record = service.get(&args.name).await?;

    output(&CredentialOutput::from(&record), json_mode);
    Ok(())
}
