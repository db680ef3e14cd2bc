//! List command - Show every level and its algorithm

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use crate::{
    cli::{
        config::{CommonConfig, OutputFormat},
        output,
    },
    scenario::Algorithm,
};

#[derive(Parser, Debug)]
#[command(about = "List levels and algorithm names")]
pub struct ListArgs {}

#[derive(Serialize)]
struct LevelEntry {
    level: u32,
    algorithm: Algorithm,
    description: &'static str,
}

pub fn execute(_args: ListArgs, common: &CommonConfig) -> Result<()> {
    match common.format {
        OutputFormat::Text => output::print_levels(),
        OutputFormat::Json => {
            let entries: Vec<LevelEntry> = Algorithm::ALL
                .into_iter()
                .map(|algorithm| LevelEntry {
                    level: algorithm.level(),
                    algorithm,
                    description: algorithm.description(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}
