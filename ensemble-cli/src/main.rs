//! Ensemble — composite build orchestration CLI.
//!
//! # Usage
//!
//! ```text
//! ensemble run [--manifest ensemble.yaml] [--target <id>] [--json] <task>...
//! ensemble participants [--manifest ensemble.yaml] [--json]
//! ```
//!
//! The composite manifest declares the participant builds (id, root
//! directory, task command table) and a default target; `run` retargets the
//! requested tasks at the target participant and executes them in-process.

mod commands;
mod engine;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{participants::ParticipantsArgs, run::RunArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "ensemble",
    version,
    about = "Run build tasks against one participant of a composite build",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute tasks against the composite's target participant.
    Run(RunArgs),

    /// List the participant builds declared in the composite manifest.
    Participants(ParticipantsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Participants(args) => args.run(),
    }
}
