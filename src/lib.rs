//! Classical AI algorithms, one level at a time
//!
//! This crate provides:
//! - A* pathfinding over weighted grids with pluggable heuristics
//! - Minimax with alpha-beta pruning and a teaching mode that plays
//!   deliberate second-best moves
//! - Exact inference in a small Bayesian network
//! - Tower of Hanoi and a goal-stack Blocks World planner
//! - N-Queens and Sudoku by backtracking
//! - Hill climbing with random restarts
//! - Forward and backward chaining over Horn rules
//! - MDP value iteration, policy extraction and simulation
//!
//! Every algorithm is also reachable as a numbered level through
//! [`scenario::run`].

pub mod adversarial;
pub mod bayes;
pub mod cli;
pub mod csp;
pub mod error;
pub mod identifiers;
pub mod local_search;
pub mod logic;
pub mod mdp;
pub mod pathfinding;
pub mod planning;
pub mod scenario;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use identifiers::{ActionId, StateId};
pub use scenario::{Algorithm, Scenario, ScenarioInput, ScenarioOutcome, run};
pub use types::{Discount, Probability};
