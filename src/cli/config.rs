//! Shared configuration types for CLI commands

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Plain key/value sections
    #[default]
    Text,
    /// The serialized scenario outcome
    Json,
}

/// Options accepted by every command
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct CommonConfig {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            seed: None,
            format: OutputFormat::Text,
            log_level: "warn".to_string(),
        }
    }
}
