//! `tokn update NAME [--expiry-days N] [--notes TEXT] [--rotation-type auto|manual]`

use anyhow::{anyhow, Result};
use clap::Args;

use super::info::CredentialOutput;
use super::ActionOutput;
use crate::cli::context::AppContext;
use crate::cli::display::output;
use crate::domain::models::RotationType;
use crate::services::CredentialUpdate;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Credential name
    pub name: String,

    /// Reset the expiry to N days from now
    #[arg(short, long)]
    pub expiry_days: Option<i64>,

    /// Replace the notes
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Change the rotation type (auto, manual)
    #[arg(short, long)]
    pub rotation_type: Option<String>,
}

impl TryFrom<&UpdateArgs> for CredentialUpdate {
    type Error = anyhow::Error;

    fn try_from(args: &UpdateArgs) -> Result<Self> {
        let rotation_type = args
            .rotation_type
            .as_deref()
            .map(|raw| RotationType::from_str(raw).ok_or_else(|| anyhow!("Invalid rotation type: {raw}")))
            .transpose()?;

        Ok(Self {
            expiry_days: args.expiry_days,
            notes: args.notes.clone(),
            rotation_type,
        })
    }
}

pub async fn execute(args: UpdateArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let changes = CredentialUpdate::try_from(&args)?;
    let service = ctx.credential_service()?;
    let updated = service.update(&args.name, changes).await?;

    let out = ActionOutput {
        success: true,
        message: format!("Credential updated: {}", updated.name),
        credential: Some(CredentialOutput::from(&updated)),
    };
    output(&out, json_mode);
    Ok(())
}
