//! Distance estimates used to guide A*

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::grid::{Cell, Grid};
use crate::error::{Error, Result};

/// Penalty added per obstacle adjacent to the evaluated cell.
pub const SAFETY_PENALTY: f64 = 0.5;

/// Heuristic selection for [`super::PathFinder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// L1 distance scaled by the grid's cheapest step.
    #[default]
    Manhattan,
    /// Straight-line distance scaled by the grid's cheapest step.
    Euclidean,
    /// Manhattan plus a penalty for nearby obstacles. Steers paths away from
    /// walls at the price of the optimality guarantee.
    ManhattanWithSafety,
    /// Always 0, which turns A* into Dijkstra's algorithm.
    Zero,
}

impl Heuristic {
    pub const ALL: [Heuristic; 4] = [
        Heuristic::Manhattan,
        Heuristic::Euclidean,
        Heuristic::ManhattanWithSafety,
        Heuristic::Zero,
    ];

    /// Estimate the remaining cost from `cell` to the nearest of `goals`.
    ///
    /// Distances are multiplied by `grid.min_step_cost()` so the estimate never
    /// exceeds the true cost on grids where every step costs at least that much.
    pub fn estimate(&self, grid: &Grid, cell: Cell, goals: &[Cell]) -> f64 {
        let scale = grid.min_step_cost();
        let nearest = |distance: fn(Cell, Cell) -> f64| {
            goals
                .iter()
                .map(|goal| distance(cell, *goal))
                .min_by(f64::total_cmp)
                .unwrap_or(0.0)
        };
        match self {
            Heuristic::Manhattan => scale * nearest(manhattan),
            Heuristic::Euclidean => scale * nearest(euclidean),
            Heuristic::ManhattanWithSafety => {
                scale * nearest(manhattan)
                    + SAFETY_PENALTY * grid.obstacles_around(cell) as f64
            }
            Heuristic::Zero => 0.0,
        }
    }

    /// Whether A* with this heuristic is guaranteed to return a cheapest path.
    pub fn is_admissible(&self) -> bool {
        !matches!(self, Heuristic::ManhattanWithSafety)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Heuristic::Manhattan => "manhattan",
            Heuristic::Euclidean => "euclidean",
            Heuristic::ManhattanWithSafety => "safety",
            Heuristic::Zero => "zero",
        }
    }
}

fn manhattan(a: Cell, b: Cell) -> f64 {
    a.manhattan(b) as f64
}

fn euclidean(a: Cell, b: Cell) -> f64 {
    let dx = a.x.abs_diff(b.x) as f64;
    let dy = a.y.abs_diff(b.y) as f64;
    dx.hypot(dy)
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Heuristic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "manhattan" => Ok(Heuristic::Manhattan),
            "euclidean" => Ok(Heuristic::Euclidean),
            "safety" | "manhattan_with_safety" | "manhattan-with-safety" => {
                Ok(Heuristic::ManhattanWithSafety)
            }
            "zero" | "dijkstra" => Ok(Heuristic::Zero),
            _ => Err(Error::InvalidConfiguration {
                message: format!(
                    "unknown heuristic '{s}' (expected manhattan, euclidean, safety or zero)"
                ),
            }),
        }
    }
}
