//! kindness CLI - Classical AI algorithms, one level at a time
//!
//! This CLI provides a unified interface for:
//! - Listing the available levels
//! - Running a level with its defaults or a JSON input record
//! - Running tagged scenario files
//! - Solving and simulating Markov decision processes

use anyhow::Result;
use clap::{Parser, Subcommand};
use kindness::cli::{
    commands::{level, list, mdp, run},
    config::CommonConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kindness")]
#[command(version, about = "Classical search, inference and planning algorithms", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List levels and their algorithms
    List(list::ListArgs),

    /// Run a level by number
    Level(level::LevelArgs),

    /// Run a tagged scenario file
    Run(run::RunArgs),

    /// Value iteration, simulation and history export for MDPs
    Mdp(mdp::MdpArgs),
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.common.log_level);

    match cli.command {
        Commands::List(args) => list::execute(args, &cli.common),
        Commands::Level(args) => level::execute(args, &cli.common),
        Commands::Run(args) => run::execute(args, &cli.common),
        Commands::Mdp(args) => mdp::execute(args, &cli.common),
    }
}
