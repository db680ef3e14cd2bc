//! Tower of Hanoi: recursive move generation and move-list replay

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Largest disk count accepted by [`solve`]; 2^20 - 1 moves is about a million.
pub const MAX_DISKS: u32 = 20;

/// Names of the three pegs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PegLabels {
    pub source: String,
    pub target: String,
    pub auxiliary: String,
}

impl Default for PegLabels {
    fn default() -> Self {
        Self::new("A", "C", "B")
    }
}

impl PegLabels {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        auxiliary: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            auxiliary: auxiliary.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.source == self.target
            || self.source == self.auxiliary
            || self.target == self.auxiliary
        {
            return Err(Error::DuplicatePegs {
                source_peg: self.source.clone(),
                target: self.target.clone(),
                auxiliary: self.auxiliary.clone(),
            });
        }
        Ok(())
    }

    fn index_of(&self, label: &str) -> Option<usize> {
        [&self.source, &self.target, &self.auxiliary]
            .iter()
            .position(|peg| peg.as_str() == label)
    }
}

/// One disk transfer. Disk 1 is the smallest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HanoiMove {
    pub disk: u32,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HanoiSolution {
    pub disks: u32,
    pub moves: Vec<HanoiMove>,
    /// Always `2^disks - 1`.
    pub total_moves: u64,
}

/// Generate the optimal move sequence for `disks` disks.
///
/// ```
/// use kindness::planning::hanoi::{solve, PegLabels};
///
/// let solution = solve(3, &PegLabels::default()).unwrap();
/// assert_eq!(solution.total_moves, 7);
/// assert_eq!((solution.moves[0].from.as_str(), solution.moves[0].to.as_str()), ("A", "C"));
/// ```
pub fn solve(disks: u32, pegs: &PegLabels) -> Result<HanoiSolution> {
    check_disks(disks)?;
    pegs.validate()?;

    let mut moves = Vec::with_capacity((1usize << disks) - 1);
    transfer(disks, &pegs.source, &pegs.target, &pegs.auxiliary, &mut moves);
    info!(disks, moves = moves.len(), "hanoi solved");
    Ok(HanoiSolution {
        disks,
        total_moves: moves.len() as u64,
        moves,
    })
}

fn check_disks(disks: u32) -> Result<()> {
    if disks > MAX_DISKS {
        return Err(Error::TooManyDisks {
            disks,
            max: MAX_DISKS,
        });
    }
    Ok(())
}

fn transfer(n: u32, from: &str, to: &str, via: &str, moves: &mut Vec<HanoiMove>) {
    if n == 0 {
        return;
    }
    transfer(n - 1, from, via, to, moves);
    moves.push(HanoiMove {
        disk: n,
        from: from.to_string(),
        to: to.to_string(),
    });
    transfer(n - 1, via, to, from, moves);
}

/// Replay `moves` starting with all disks on the source peg and return the
/// final stacks (bottom first) for source, target and auxiliary.
///
/// # Errors
///
/// [`Error::TooManyDisks`] above [`MAX_DISKS`]. [`Error::IllegalMove`] for an
/// unknown peg, a move from an empty peg, a disk that is not on top of its
/// peg, or a larger disk placed on a smaller one.
pub fn replay(disks: u32, pegs: &PegLabels, moves: &[HanoiMove]) -> Result<[Vec<u32>; 3]> {
    check_disks(disks)?;
    pegs.validate()?;
    let mut stacks: [Vec<u32>; 3] = [(1..=disks).rev().collect(), Vec::new(), Vec::new()];

    for (index, mv) in moves.iter().enumerate() {
        let illegal = |reason: String| Error::IllegalMove { index, reason };
        let from = pegs
            .index_of(&mv.from)
            .ok_or_else(|| illegal(format!("unknown peg '{}'", mv.from)))?;
        let to = pegs
            .index_of(&mv.to)
            .ok_or_else(|| illegal(format!("unknown peg '{}'", mv.to)))?;
        let top = *stacks[from]
            .last()
            .ok_or_else(|| illegal(format!("peg {} is empty", mv.from)))?;
        if top != mv.disk {
            return Err(illegal(format!(
                "disk {} is not on top of peg {} (top is {top})",
                mv.disk, mv.from
            )));
        }
        if let Some(&below) = stacks[to].last()
            && below < top
        {
            return Err(illegal(format!(
                "cannot place disk {top} on smaller disk {below} on peg {}",
                mv.to
            )));
        }
        stacks[from].pop();
        stacks[to].push(top);
    }
    Ok(stacks)
}

/// True when every disk ends on the target peg.
pub fn is_solved(disks: u32, stacks: &[Vec<u32>; 3]) -> bool {
    stacks[0].is_empty() && stacks[2].is_empty() && stacks[1].len() == disks as usize
}
