//! 9x9 Sudoku by backtracking over the first empty cell

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// A puzzle grid; 0 marks an empty cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Sudoku {
    cells: [[u8; 9]; 9],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SudokuStats {
    /// Digits written into empty cells.
    pub guesses: u64,
    pub backtracks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SudokuResult {
    /// `None` when the givens admit no completion.
    pub solution: Option<Sudoku>,
    pub stats: SudokuStats,
}

impl Sudoku {
    /// Build a puzzle, rejecting digits above 9 and conflicting givens.
    pub fn new(cells: [[u8; 9]; 9]) -> Result<Self> {
        let sudoku = Self { cells };
        for row in 0..9 {
            for col in 0..9 {
                let digit = cells[row][col];
                if digit > 9 {
                    return Err(Error::InvalidSudoku {
                        message: format!("cell ({row}, {col}) holds {digit}"),
                    });
                }
                if digit != 0 && !sudoku.allows(row, col, digit) {
                    return Err(Error::InvalidSudoku {
                        message: format!("given {digit} at ({row}, {col}) conflicts with another given"),
                    });
                }
            }
        }
        Ok(sudoku)
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    pub fn rows(&self) -> &[[u8; 9]; 9] {
        &self.cells
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().flatten().all(|&d| d != 0)
    }

    /// Whether `digit` may go at (row, col) given every other cell.
    fn allows(&self, row: usize, col: usize, digit: u8) -> bool {
        let (box_row, box_col) = (row / 3 * 3, col / 3 * 3);
        (0..9).all(|i| {
            (i == col || self.cells[row][i] != digit)
                && (i == row || self.cells[i][col] != digit)
                && {
                    let (r, c) = (box_row + i / 3, box_col + i % 3);
                    (r, c) == (row, col) || self.cells[r][c] != digit
                }
        })
    }

    fn first_empty(&self) -> Option<(usize, usize)> {
        (0..81)
            .map(|i| (i / 9, i % 9))
            .find(|&(r, c)| self.cells[r][c] == 0)
    }

    fn fill(&mut self, stats: &mut SudokuStats) -> bool {
        let Some((row, col)) = self.first_empty() else {
            return true;
        };
        for digit in 1..=9 {
            if self.allows(row, col, digit) {
                self.cells[row][col] = digit;
                stats.guesses += 1;
                if self.fill(stats) {
                    return true;
                }
                self.cells[row][col] = 0;
                stats.backtracks += 1;
            }
        }
        false
    }

    pub fn solve(&self) -> SudokuResult {
        let mut work = *self;
        let mut stats = SudokuStats::default();
        let solved = work.fill(&mut stats);
        info!(solved, guesses = stats.guesses, backtracks = stats.backtracks, "sudoku search finished");
        SudokuResult {
            solution: solved.then_some(work),
            stats,
        }
    }
}

impl TryFrom<Vec<Vec<u8>>> for Sudoku {
    type Error = Error;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self> {
        if rows.len() != 9 || rows.iter().any(|r| r.len() != 9) {
            return Err(Error::InvalidSudoku {
                message: "grid must have 9 rows of 9 cells".to_string(),
            });
        }
        let mut cells = [[0u8; 9]; 9];
        for (target, row) in cells.iter_mut().zip(&rows) {
            target.copy_from_slice(row);
        }
        Sudoku::new(cells)
    }
}

impl From<Sudoku> for Vec<Vec<u8>> {
    fn from(sudoku: Sudoku) -> Self {
        sudoku.cells.iter().map(|r| r.to_vec()).collect()
    }
}

impl FromStr for Sudoku {
    type Err = Error;

    /// 81 cells of `1`-`9`, with `0` or `.` for blanks; whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let digits: Vec<u8> = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                '.' | '0' => Ok(0),
                '1'..='9' => Ok(c as u8 - b'0'),
                other => Err(Error::InvalidSudoku {
                    message: format!("unexpected character '{other}'"),
                }),
            })
            .collect::<Result<_>>()?;
        if digits.len() != 81 {
            return Err(Error::InvalidSudoku {
                message: format!("expected 81 cells, found {}", digits.len()),
            });
        }
        Sudoku::try_from(digits.chunks(9).map(<[u8]>::to_vec).collect::<Vec<_>>())
    }
}

impl fmt::Display for Sudoku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 && r % 3 == 0 {
                writeln!(f, "------+-------+------")?;
            }
            for (c, d) in row.iter().enumerate() {
                if c > 0 && c % 3 == 0 {
                    write!(f, "| ")?;
                }
                if *d == 0 {
                    write!(f, ". ")?;
                } else {
                    write!(f, "{d} ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
