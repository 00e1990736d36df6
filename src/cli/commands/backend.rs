//! `tokn backend show|set|migrate`

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use crate::adapters::backends::{migrate_backend, LocalBackend, METADATA_SECRET, SUPPORTED_BACKENDS};
use crate::cli::context::AppContext;
use crate::cli::display::{action_success, label, output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct BackendArgs {
    #[command(subcommand)]
    pub command: BackendCommands,
}

#[derive(Subcommand, Debug)]
pub enum BackendCommands {
    /// Show the configured registry backend
    Show,

    /// Select the registry backend without copying data
    Set {
        /// Backend type (local, doppler)
        backend_type: String,
    },

    /// Copy the registry to another backend and select it
    Migrate {
        /// Source backend (defaults to the configured one)
        #[arg(short, long)]
        from: Option<String>,

        /// Destination backend
        #[arg(short, long)]
        to: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct BackendOutput {
    pub backend: String,
    /// Where the registry lives for this backend
    pub location: String,
    pub config_file: String,
}

impl BackendOutput {
    fn describe(config: &Config, config_file: &std::path::Path) -> Self {
        let location = match config.backend.as_str() {
            "doppler" => format!(
                "doppler secret {METADATA_SECRET} (project {}, config {})",
                config.doppler.project, config.doppler.config
            ),
            _ => LocalBackend::new(&config.local.data_dir)
                .registry_file()
                .display()
                .to_string(),
        };
        Self {
            backend: config.backend.clone(),
            location,
            config_file: config_file.display().to_string(),
        }
    }
}

impl CommandOutput for BackendOutput {
    fn to_human(&self) -> String {
        [
            format!("{} {}", label("Backend"), self.backend),
            format!("{} {}", label("Registry"), self.location),
            format!("{} {}", label("Config"), self.config_file),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct BackendChangeOutput {
    pub message: String,
    pub migrated: Option<usize>,
    pub backend: BackendOutput,
}

impl CommandOutput for BackendChangeOutput {
    fn to_human(&self) -> String {
        format!("{}\n{}", action_success(&self.message), self.backend.to_human())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn ensure_supported(backend_type: &str) -> Result<()> {
    if !SUPPORTED_BACKENDS.contains(&backend_type) {
        bail!(
            "Unknown backend type: {backend_type}. Supported backends: {}",
            SUPPORTED_BACKENDS.join(", ")
        );
    }
    Ok(())
}

pub async fn execute(args: BackendArgs, ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    match args.command {
        BackendCommands::Show => {
            output(&BackendOutput::describe(&ctx.config, &ctx.config_path), json_mode);
        }

        BackendCommands::Set { backend_type } => {
            ensure_supported(&backend_type)?;
            ctx.config.backend = backend_type;
            ctx.save_config().context("Failed to save configuration")?;

            let out = BackendChangeOutput {
                message: format!("Backend set to {}", ctx.config.backend),
                migrated: None,
                backend: BackendOutput::describe(&ctx.config, &ctx.config_path),
            };
            output(&out, json_mode);
        }

        BackendCommands::Migrate { from, to } => {
            let from = from.unwrap_or_else(|| ctx.config.backend.clone());
            ensure_supported(&from)?;
            ensure_supported(&to)?;

            let doppler = ctx.doppler();
            let count = migrate_backend(&from, &to, &mut ctx.config, doppler).await?;
            ctx.save_config().context("Migrated registry, but failed to save configuration")?;

            let out = BackendChangeOutput {
                message: format!("Migrated {count} credential(s) from {from} to {to}"),
                migrated: Some(count),
                backend: BackendOutput::describe(&ctx.config, &ctx.config_path),
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
