// ABOUTME: Entry point for the ecs-release CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use ecs_release::config::{self, Config};
use ecs_release::diagnostics::Diagnostics;
use ecs_release::error::Result;
use ecs_release::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli.command, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands, mode: OutputMode) -> Result<()> {
    let output = Output::new(mode);

    match command {
        Commands::Init { force } => {
            let cwd = env::current_dir()?;
            let path = config::init_config(&cwd, force)?;
            output.success(&format!("Created {}", path.display()));
            Ok(())
        }
        Commands::Deploy { config } => {
            let cwd = env::current_dir()?;
            let mut diag = Diagnostics::default();
            let config = Config::resolve(&cwd, config.as_deref(), &mut diag)?;
            commands::deploy(config, diag, output).await
        }
        Commands::Status { config } => {
            let cwd = env::current_dir()?;
            let mut diag = Diagnostics::default();
            let config = Config::resolve(&cwd, config.as_deref(), &mut diag)?;
            for warning in diag.warnings() {
                output.warning(&warning.message);
            }
            commands::status(config, output).await
        }
        Commands::Render {
            task_definition,
            container,
            image,
        } => commands::render(&task_definition, &container, &image),
    }
}
