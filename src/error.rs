//! Error types for the kindness crate

use thiserror::Error;

/// Main error type for the kindness crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid level {level} (expected 1-{max})")]
    InvalidLevel { level: u32, max: u32 },

    #[error("unknown algorithm '{input}'. Expected one of: {expected}")]
    ParseAlgorithm { input: String, expected: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("start cell ({x}, {y}) is an obstacle")]
    BlockedStart { x: usize, y: usize },

    #[error("at least one goal cell is required")]
    NoGoals,

    #[error("terrain cost {cost} must be finite and at least 1")]
    InvalidTerrainCost { cost: f64 },

    #[error("invalid grid: {message}")]
    InvalidGrid { message: String },

    #[error("unknown variable '{name}' in evidence (expected one of: {expected})")]
    UnknownVariable { name: String, expected: String },

    #[error("invalid evidence for '{variable}': '{value}' is not a boolean")]
    InvalidEvidence { variable: String, value: String },

    #[error("conflicting evidence for '{variable}': observed both true and false")]
    ConflictingEvidence { variable: String },

    #[error("probability {value} must lie in [0, 1]")]
    InvalidProbability { value: f64 },

    #[error("evidence has zero probability under the network")]
    ImpossibleEvidence,

    #[error("{disks} disks requested but at most {max} are supported")]
    TooManyDisks { disks: u32, max: u32 },

    #[error("peg labels must be distinct, got '{source_peg}', '{target}', '{auxiliary}'")]
    DuplicatePegs {
        source_peg: String,
        target: String,
        auxiliary: String,
    },

    #[error("illegal move {index}: {reason}")]
    IllegalMove { index: usize, reason: String },

    #[error("board size {n} is invalid (must be at least 1)")]
    InvalidBoardSize { n: usize },

    #[error("invalid sudoku: {message}")]
    InvalidSudoku { message: String },

    #[error("malformed atom '{atom}': {reason}")]
    MalformedAtom { atom: String, reason: String },

    #[error("malformed rule '{rule}': {reason}")]
    MalformedRule { rule: String, reason: String },

    #[error("unsafe rule '{rule}': conclusion variable '{variable}' does not occur in any premise")]
    UnsafeRule { rule: String, variable: String },

    #[error("unknown rule base '{input}'. Expected one of: {expected}")]
    ParseRuleBase { input: String, expected: String },

    #[error("invalid blocks configuration: {message}")]
    InvalidBlocks { message: String },

    #[error("state '{state}' is not defined in the model")]
    UnknownState { state: String },

    #[error("transition distribution for ({state}, {action}) sums to {total}, expected 1")]
    InvalidDistribution {
        state: String,
        action: String,
        total: f64,
    },

    #[error("discount factor {value} must lie in (0, 1)")]
    InvalidDiscount { value: f64 },

    #[error("non-terminal state '{state}' has no available actions")]
    NoActionsAvailable { state: String },

    #[error("invalid search bounds: {message}")]
    InvalidBounds { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
