//! `tokn remove NAME`

use anyhow::Result;
use clap::Args;

use super::ActionOutput;
use crate::cli::context::AppContext;
use crate::cli::display::output;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Credential name
    pub name: String,
}

pub async fn execute(args: RemoveArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    ctx.credential_service()?.remove(&args.name).await?;

    let out = ActionOutput {
        success: true,
        message: format!("Credential removed: {}", args.name),
        credential: None,
    };
    output(&out, json_mode);
    Ok(())
}
