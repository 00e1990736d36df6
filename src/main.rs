//! tokn CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use tokn::cli::commands;
use tokn::cli::{handle_error, AppContext, Cli, Commands};
use tokn::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = cli.json;

    let mut ctx = match AppContext::load(cli.config) {
        Ok(ctx) => ctx,
        Err(err) => {
            handle_error(&err, json_mode);
            return ExitCode::FAILURE;
        }
    };

    // Held until exit so the file writer flushes.
    let _logger = match LoggerImpl::init(&LogConfig::from(&ctx.config.logging)) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Track(args) => commands::track::execute(args, &ctx, json_mode).await,
        Commands::Rotate(args) => commands::rotate::execute(args, &ctx, json_mode).await,
        Commands::Status(args) => commands::status::execute(args, &ctx, json_mode).await,
        Commands::Info(args) => commands::info::execute(args, &ctx, json_mode).await,
        Commands::Update(args) => commands::update::execute(args, &ctx, json_mode).await,
        Commands::Remove(args) => commands::remove::execute(args, &ctx, json_mode).await,
        Commands::Sync => commands::sync::execute(&ctx, json_mode).await,
        Commands::Backend(args) => commands::backend::execute(args, &mut ctx, json_mode).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            handle_error(&err, json_mode);
            ExitCode::FAILURE
        }
    }
}
