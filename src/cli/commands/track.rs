//! `tokn track NAME --service S --location kind:path[:k=v,...]`

use anyhow::{bail, Result};
use chrono::{Duration, Utc};
use clap::Args;

use super::info::CredentialOutput;
use super::ActionOutput;
use crate::adapters::providers::SUPPORTED_SERVICES;
use crate::cli::context::AppContext;
use crate::cli::display::output;
use crate::domain::models::{CredentialLocation, CredentialRecord, RotationType};

#[derive(Args, Debug)]
pub struct TrackArgs {
    /// Unique credential name
    pub name: String,

    /// Service provider (github, cloudflare, linode-cli, linode-doppler,
    /// terraform-account, postman, akamai, other)
    #[arg(short, long)]
    pub service: String,

    /// Rotation type (auto, manual)
    #[arg(short, long, default_value = "auto")]
    pub rotation_type: String,

    /// Location as 'type:path[:key=value,...]' (repeatable)
    #[arg(short, long = "location")]
    pub locations: Vec<String>,

    /// Days until expiry
    #[arg(short, long, default_value_t = 30)]
    pub expiry_days: i64,

    /// Preferred day of the month for manual rotation
    #[arg(long, default_value_t = 1)]
    pub rotation_day: u8,

    /// Additional notes
    #[arg(short, long, default_value = "")]
    pub notes: String,
}

/// Turn parsed arguments into a record ready for the registry.
pub fn build_record(args: &TrackArgs) -> Result<CredentialRecord> {
    if !SUPPORTED_SERVICES.contains(&args.service.as_str()) {
        bail!(
            "Unknown service: {}. Supported services: {}",
            args.service,
            SUPPORTED_SERVICES.join(", ")
        );
    }

    let rotation_type = RotationType::from_str(&args.rotation_type)
        .ok_or_else(|| anyhow::anyhow!("Invalid rotation type: {}", args.rotation_type))?;

    if args.expiry_days <= 0 {
        bail!("Invalid expiry days: {} (must be positive)", args.expiry_days);
    }

    let locations = args
        .locations
        .iter()
        .map(|spec| CredentialLocation::from_str(spec).map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;

    let expires_at = Duration::try_days(args.expiry_days)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| anyhow::anyhow!("Invalid expiry days: {} (out of range)", args.expiry_days))?;

    let mut record = CredentialRecord::new(&args.name, &args.service, rotation_type, locations)
        .with_expiry(expires_at)
        .with_notes(&args.notes);
    record.rotation_day = args.rotation_day;
    Ok(record)
}

pub async fn execute(args: TrackArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let record = build_record(&args)?;
    let service = ctx.credential_service()?;
    let tracked = service.track(record).await?;

    let out = ActionOutput {
        success: true,
        message: "Credential tracked successfully".to_string(),
        credential: Some(CredentialOutput::from(&tracked)),
    };
    output(&out, json_mode);
    Ok(())
}
