// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecs-release")]
#[command(about = "Rolling and blue/green image releases for Amazon ECS services")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new ecs-release.yml configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Release the configured image
    Deploy {
        /// Config file (default: discovered, then PLUGIN_* environment)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show desired/running counts of the configured services
    Status {
        /// Config file (default: discovered, then PLUGIN_* environment)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Patch an exported task definition offline and print it
    Render {
        /// Task definition JSON (bare or describe-task-definition output)
        #[arg(long)]
        task_definition: PathBuf,

        /// Container whose image is replaced
        #[arg(long)]
        container: String,

        /// New image reference
        #[arg(long)]
        image: String,
    },
}
