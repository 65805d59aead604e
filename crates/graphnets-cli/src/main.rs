//! graphnets - run graph neural network models from JSON configs
//!
//! Usage:
//!   graphnets describe --config model.json            # Model kind, layers, parameters
//!   graphnets describe --config model.json --json     # Same, as JSON
//!   graphnets run --config model.json -n 32 -t 8      # Forward pass on a random ring graph
//!   graphnets run -c model.json --seed 7 --eval       # Reproducible, dropout disabled

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

use commands::{describe, run};

/// graphnets - Graph neural network runner
///
/// Build a model from a JSON config and run it over graph snapshots.
#[derive(Parser)]
#[command(name = "graphnets")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print model kind, layer count and parameter count
    Describe {
        /// Path to a JSON model config
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },

    /// Run a forward pass over random snapshots on a ring graph
    Run {
        /// Path to a JSON model config
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Number of graph nodes
        #[arg(short, long, default_value = "16")]
        nodes: usize,

        /// Number of snapshots in the sequence
        #[arg(short = 't', long, default_value = "4")]
        snapshots: usize,

        /// Seed for the model and the random inputs
        #[arg(long)]
        seed: Option<u64>,

        /// Disable dropout and use running normalization statistics
        #[arg(long)]
        eval: bool,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Describe { config } => describe::run(&config, cli.json),
        Commands::Run {
            config,
            nodes,
            snapshots,
            seed,
            eval,
        } => run::run(
            &config,
            &run::RunOptions {
                nodes,
                snapshots,
                seed,
                eval,
                json: cli.json,
            },
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}
