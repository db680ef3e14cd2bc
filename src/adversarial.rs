//! Adversarial search over explicit game trees

pub mod alphabeta;
pub mod tree;

pub use alphabeta::{
    AlphaBeta, AlphaBetaResult, Difficulty, SearchConfig, SearchStats, Substitution,
    TeachingPolicy, minimax,
};
pub use tree::{GameTreeNode, Player};
