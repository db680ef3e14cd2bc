//! Level command - Run one level with its defaults or a JSON input record

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{config::CommonConfig, output},
    scenario::{self, Algorithm, ScenarioInput},
};

#[derive(Parser, Debug)]
#[command(about = "Run a level by number")]
pub struct LevelArgs {
    /// Level number (see `list`)
    pub level: u32,

    /// JSON input record for the level's algorithm
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,
}

pub fn execute(args: LevelArgs, common: &CommonConfig) -> Result<()> {
    let algorithm = Algorithm::from_level(args.level)?;
    let mut input = match &args.input {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ScenarioInput::from_record(algorithm, &json)
                .with_context(|| format!("invalid {algorithm} input in {}", path.display()))?
        }
        None => ScenarioInput::defaults(algorithm),
    };
    if let Some(seed) = common.seed {
        input = input.with_seed(seed);
    }

    let outcome = scenario::run(&input)?;
    output::emit(&outcome, common.format)
}
