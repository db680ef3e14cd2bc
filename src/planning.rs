//! Classical planners: recursive Tower of Hanoi and goal-stack Blocks World

pub mod blocks;
pub mod hanoi;

pub use blocks::{BlockMove, BlockState, BlocksPlan, Support};
pub use hanoi::{HanoiMove, HanoiSolution, PegLabels};
