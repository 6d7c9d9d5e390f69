use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "brownout",
    about = "brownout: risk-aware autoscaling and load shedding for server farms",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Log every control-cycle decision.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured policy against the simulated fleet.
    Run {
        /// Path to brownout.toml
        #[arg(short, long, default_value = "brownout.toml")]
        config: PathBuf,
        /// Number of control cycles to simulate.
        #[arg(short = 'n', long, default_value = "100")]
        cycles: u64,
        /// Override policy.chaos_seed for a reproducible run.
        #[arg(short, long)]
        seed: Option<u64>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Validate a config file and print the effective settings.
    Check {
        #[arg(short, long, default_value = "brownout.toml")]
        config: PathBuf,
    },
    /// Write a brownout.toml scaffold.
    Init {
        #[arg(short, long, default_value = "brownout.toml")]
        path: PathBuf,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.verbose { "info,brownout=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_directive))?,
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            config,
            cycles,
            seed,
            format,
        } => commands::run::run(&config, cycles, seed, &format),
        Commands::Check { config } => commands::check::check(&config),
        Commands::Init { path, force } => commands::init::init(&path, force),
    }
}
