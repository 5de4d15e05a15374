pub mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jetson_deploy")]
#[command(about = "Jetson hardware detection and deployment configuration", long_about = None)]
struct Cli {
    /// JSON deployment config (optional)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Hardware selection shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct HardwareArgs {
    /// Model string to resolve instead of reading the device tree
    #[arg(long)]
    model: Option<String>,
    /// Compute capability override (e.g. 8.7), takes precedence over detection
    #[arg(long)]
    cuda_arch: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the Jetson module and show its profile
    Detect {
        #[command(flatten)]
        hardware: HardwareArgs,
        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the hardware .env lines to stdout
    Env {
        #[command(flatten)]
        hardware: HardwareArgs,
    },
    /// Write the hardware settings into the project .env file
    Setup {
        #[command(flatten)]
        hardware: HardwareArgs,
        /// .env file to create or update
        #[arg(long)]
        output: Option<PathBuf>,
        /// Update an existing .env without asking
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Export a client distribution bundle
    Bundle {
        #[command(flatten)]
        hardware: HardwareArgs,
        /// Bundle directory
        #[arg(long)]
        output: Option<PathBuf>,
        /// Replace the contents of a non-empty bundle directory
        #[arg(long)]
        overwrite: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Detect { hardware, json } => commands::detect(&config, &hardware, json),
        Commands::Env { hardware } => commands::env(&config, &hardware),
        Commands::Setup {
            hardware,
            output,
            yes,
        } => commands::setup(&config, &hardware, output, yes),
        Commands::Bundle {
            hardware,
            output,
            overwrite,
        } => commands::bundle(&config, &hardware, output, overwrite),
    }
}
