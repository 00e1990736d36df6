//! `tokn sync`

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::cli::context::AppContext;
use crate::cli::display::{action_success, output, CommandOutput};

#[derive(Debug, serde::Serialize)]
pub struct SyncOutput {
    pub backend: String,
    pub credentials: usize,
    pub last_sync: Option<DateTime<Utc>>,
}

impl CommandOutput for SyncOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            action_success(&format!("Synced from {} backend", self.backend)),
            format!("  Credentials: {}", self.credentials),
        ];
        if let Some(last_sync) = self.last_sync {
            lines.push(format!("  Last sync: {}", last_sync.format("%Y-%m-%d %H:%M:%S")));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(ctx: &AppContext, json_mode: bool) -> Result<()> {
    let registry = ctx.credential_service()?.sync().await?;

    let out = SyncOutput {
        backend: ctx.config.backend.clone(),
        credentials: registry.len(),
        last_sync: registry.last_sync,
    };
    output(&out, json_mode);
    Ok(())
}
