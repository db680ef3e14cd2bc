//! Run command - Solve a scenario file tagged with its algorithm

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{config::CommonConfig, output},
    scenario::{self, ScenarioInput},
};

#[derive(Parser, Debug)]
#[command(about = "Run a scenario file")]
pub struct RunArgs {
    /// JSON scenario, e.g. {"algorithm": "hanoi", "disks": 4}
    pub file: PathBuf,
}

pub fn execute(args: RunArgs, common: &CommonConfig) -> Result<()> {
    let json = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let mut input: ScenarioInput = serde_json::from_str(&json)
        .with_context(|| format!("invalid scenario in {}", args.file.display()))?;
    if let Some(seed) = common.seed {
        input = input.with_seed(seed);
    }

    let outcome = scenario::run(&input)?;
    output::emit(&outcome, common.format)
}
