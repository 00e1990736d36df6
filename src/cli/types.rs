//! Top-level CLI definition.

use clap::{Parser, Subcommand};

use super::commands::{
    backend::BackendArgs, info::InfoArgs, remove::RemoveArgs, rotate::RotateArgs,
    status::StatusArgs, track::TrackArgs, update::UpdateArgs,
};

#[derive(Parser, Debug)]
#[command(name = "tokn")]
#[command(about = "Track API credentials and rotate them everywhere they live", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ~/.config/tokn/config.yaml)
    #[arg(short, long, global = true, env = "TOKN_CONFIG")]
    pub config: Option<std::path::PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start tracking a credential
    Track(TrackArgs),

    /// Rotate one credential or all of them
    Rotate(RotateArgs),

    /// Show the expiry status of tracked credentials
    Status(StatusArgs),

    /// Show everything tokn knows about one credential
    Info(InfoArgs),

    /// Change expiry, notes, or rotation type of a credential
    Update(UpdateArgs),

    /// Stop tracking a credential
    Remove(RemoveArgs),

    /// Refresh the registry from its backend
    Sync,

    /// Inspect or switch the registry backend
    Backend(BackendArgs),
}
