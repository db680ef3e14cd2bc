//! Constraint satisfaction by backtracking

pub mod queens;
pub mod sudoku;

pub use queens::{QueensResult, QueensStats, SolutionMode};
pub use sudoku::{Sudoku, SudokuResult, SudokuStats};
