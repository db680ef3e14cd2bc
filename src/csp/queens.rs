//! N-Queens by row-by-row backtracking

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionMode {
    /// Stop at the first solution in column order.
    #[default]
    First,
    /// Enumerate every solution.
    All,
}

impl fmt::Display for SolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionMode::First => write!(f, "first"),
            SolutionMode::All => write!(f, "all"),
        }
    }
}

impl FromStr for SolutionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(SolutionMode::First),
            "all" => Ok(SolutionMode::All),
            _ => Err(Error::InvalidConfiguration {
                message: format!("unknown solution mode '{s}' (expected first or all)"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueensStats {
    /// Candidate squares tested against the placed queens.
    pub squares_checked: u64,
    pub placements: u64,
    /// Placements undone after their subtree was exhausted.
    pub backtracks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueensResult {
    pub n: usize,
    /// Each solution lists the queen's column for every row.
    pub solutions: Vec<Vec<usize>>,
    pub stats: QueensStats,
}

impl QueensResult {
    pub fn first(&self) -> Option<&[usize]> {
        self.solutions.first().map(Vec::as_slice)
    }

    pub fn has_solution(&self) -> bool {
        !self.solutions.is_empty()
    }
}

/// Partial assignment with O(1) conflict lookup.
struct Board {
    n: usize,
    queens: Vec<Option<usize>>,
    columns: Vec<bool>,
    diagonals: Vec<bool>,
    anti_diagonals: Vec<bool>,
}

impl Board {
    fn new(n: usize) -> Self {
        Self {
            n,
            queens: vec![None; n],
            columns: vec![false; n],
            diagonals: vec![false; 2 * n - 1],
            anti_diagonals: vec![false; 2 * n - 1],
        }
    }

    fn is_safe(&self, row: usize, col: usize) -> bool {
        !self.columns[col]
            && !self.diagonals[row + col]
            && !self.anti_diagonals[row + self.n - 1 - col]
    }

    fn set(&mut self, row: usize, col: usize, occupied: bool) {
        self.queens[row] = occupied.then_some(col);
        self.columns[col] = occupied;
        self.diagonals[row + col] = occupied;
        self.anti_diagonals[row + self.n - 1 - col] = occupied;
    }

    fn snapshot(&self) -> Vec<usize> {
        self.queens.iter().flatten().copied().collect()
    }
}

struct Search {
    board: Board,
    mode: SolutionMode,
    solutions: Vec<Vec<usize>>,
    stats: QueensStats,
}

impl Search {
    /// Returns true when the search should stop.
    fn place(&mut self, row: usize) -> bool {
        if row == self.board.n {
            self.solutions.push(self.board.snapshot());
            return self.mode == SolutionMode::First;
        }
        for col in 0..self.board.n {
            self.stats.squares_checked += 1;
            if !self.board.is_safe(row, col) {
                continue;
            }
            self.board.set(row, col, true);
            self.stats.placements += 1;
            if self.place(row + 1) {
                return true;
            }
            self.board.set(row, col, false);
            self.stats.backtracks += 1;
        }
        false
    }
}

/// Solve N-Queens on an `n x n` board.
///
/// Sizes 2 and 3 have no solution and return an empty solution list.
///
/// ```
/// use kindness::csp::queens::{solve, SolutionMode};
///
/// let result = solve(4, SolutionMode::First).unwrap();
/// assert_eq!(result.first(), Some(&[1, 3, 0, 2][..]));
/// ```
pub fn solve(n: usize, mode: SolutionMode) -> Result<QueensResult> {
    if n == 0 {
        return Err(Error::InvalidBoardSize { n });
    }
    let mut search = Search {
        board: Board::new(n),
        mode,
        solutions: Vec::new(),
        stats: QueensStats::default(),
    };
    search.place(0);
    if search.solutions.is_empty() {
        debug!(n, "no placement satisfies every constraint");
    }
    info!(
        n,
        %mode,
        solutions = search.solutions.len(),
        backtracks = search.stats.backtracks,
        "n-queens search finished"
    );
    Ok(QueensResult {
        n,
        solutions: search.solutions,
        stats: search.stats,
    })
}

/// True if `columns` places one queen per row with no two attacking.
pub fn is_valid_solution(columns: &[usize]) -> bool {
    let n = columns.len();
    columns.iter().all(|&c| c < n)
        && columns.iter().enumerate().all(|(r1, &c1)| {
            columns
                .iter()
                .enumerate()
                .skip(r1 + 1)
                .all(|(r2, &c2)| c1 != c2 && r1.abs_diff(r2) != c1.abs_diff(c2))
        })
}

/// Render a board with `Q` for queens and `.` for empty squares.
pub fn render(columns: &[usize]) -> String {
    let n = columns.len();
    columns
        .iter()
        .map(|&c| (0..n).map(|i| if i == c { 'Q' } else { '.' }).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_solutions_follow_column_order() {
        assert_eq!(solve(4, SolutionMode::First).unwrap().first(), Some(&[1, 3, 0, 2][..]));
        assert_eq!(
            solve(8, SolutionMode::First).unwrap().first(),
            Some(&[0, 4, 7, 5, 2, 6, 1, 3][..])
        );
        assert_eq!(solve(1, SolutionMode::First).unwrap().first(), Some(&[0][..]));
    }

    #[test]
    fn sizes_two_and_three_have_no_solution() {
        for n in [2, 3] {
            let result = solve(n, SolutionMode::All).unwrap();
            assert!(!result.has_solution());
            assert!(result.stats.backtracks > 0);
        }
    }

    #[test]
    fn counts_all_solutions() {
        assert_eq!(solve(6, SolutionMode::All).unwrap().solutions.len(), 4);
        let eight = solve(8, SolutionMode::All).unwrap();
        assert_eq!(eight.solutions.len(), 92);
        assert!(eight.solutions.iter().all(|s| is_valid_solution(s)));
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(solve(0, SolutionMode::First), Err(Error::InvalidBoardSize { n: 0 })));
    }

    #[test]
    fn validity_check_catches_diagonals() {
        assert!(is_valid_solution(&[1, 3, 0, 2]));
        assert!(!is_valid_solution(&[0, 1, 2, 3]));
        assert!(!is_valid_solution(&[0, 0]));
    }

    #[test]
    fn renders_board() {
        assert_eq!(render(&[1, 3, 0, 2]), ".Q..\n...Q\nQ...\n..Q.");
    }
}
