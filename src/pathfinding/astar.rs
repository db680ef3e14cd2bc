//! A* search over a [`Grid`]

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
};

use serde::Serialize;
use tracing::{debug, info};

use super::{
    grid::{Cell, Grid},
    heuristic::Heuristic,
};
use crate::error::{Error, Result};

/// Outcome of a single A* search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    /// Cells from start to goal inclusive; empty when no goal is reachable.
    pub path: Vec<Cell>,
    /// Sum of entry costs along the path, `f64::INFINITY` when unreachable.
    pub cost: f64,
    /// Goal that was reached, if any.
    pub goal: Option<Cell>,
    pub nodes_expanded: usize,
    pub nodes_generated: usize,
    /// False when the heuristic in use may overestimate.
    pub optimality_guaranteed: bool,
}

impl PathResult {
    pub fn found(&self) -> bool {
        self.goal.is_some()
    }

    /// Number of moves along the path.
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Frontier entry. Ordered so the max-heap pops the lowest `f`, then the
/// earliest insertion.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    f: f64,
    g: f64,
    seq: u64,
    cell: Cell,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Best-first path search with a pluggable heuristic.
///
/// ```
/// use kindness::pathfinding::{Cell, Grid, PathFinder};
///
/// let grid = Grid::new(10, 10).unwrap();
/// let result = PathFinder::default()
///     .find_path(&grid, Cell::new(0, 0), &[Cell::new(9, 9)])
///     .unwrap();
/// assert_eq!(result.path.len(), 19);
/// assert_eq!(result.cost, 18.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PathFinder {
    heuristic: Heuristic,
}

impl PathFinder {
    pub fn new(heuristic: Heuristic) -> Self {
        Self { heuristic }
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Search from `start` to the nearest reachable cell in `goals`.
    ///
    /// # Errors
    ///
    /// Fails if `goals` is empty, any cell lies outside the grid, or `start`
    /// is an obstacle. An unreachable goal is not an error.
    pub fn find_path(&self, grid: &Grid, start: Cell, goals: &[Cell]) -> Result<PathResult> {
        if goals.is_empty() {
            return Err(Error::NoGoals);
        }
        for cell in std::iter::once(&start).chain(goals) {
            if !grid.contains(*cell) {
                return Err(Error::OutOfBounds {
                    x: cell.x,
                    y: cell.y,
                    width: grid.width(),
                    height: grid.height(),
                });
            }
        }
        if !grid.is_walkable(start) {
            return Err(Error::BlockedStart {
                x: start.x,
                y: start.y,
            });
        }

        let goal_set: HashSet<Cell> = goals.iter().copied().collect();
        let mut open = BinaryHeap::new();
        let mut closed = HashSet::new();
        let mut g_score: HashMap<Cell, f64> = HashMap::new();
        let mut came_from: HashMap<Cell, Cell> = HashMap::new();
        let mut seq = 0u64;
        let mut nodes_expanded = 0;
        let mut nodes_generated = 1;

        g_score.insert(start, 0.0);
        open.push(Frontier {
            f: self.heuristic.estimate(grid, start, goals),
            g: 0.0,
            seq,
            cell: start,
        });

        while let Some(Frontier { g, cell, .. }) = open.pop() {
            if !closed.insert(cell) {
                continue;
            }
            nodes_expanded += 1;

            if goal_set.contains(&cell) {
                let path = reconstruct(&came_from, cell);
                info!(
                    heuristic = %self.heuristic,
                    cost = g,
                    steps = path.len() - 1,
                    nodes_expanded,
                    "path found"
                );
                return Ok(PathResult {
                    path,
                    cost: g,
                    goal: Some(cell),
                    nodes_expanded,
                    nodes_generated,
                    optimality_guaranteed: self.heuristic.is_admissible(),
                });
            }

            for (next, step) in grid.neighbors(cell) {
                if closed.contains(&next) {
                    continue;
                }
                let tentative = g + step;
                if tentative < g_score.get(&next).copied().unwrap_or(f64::INFINITY) {
                    g_score.insert(next, tentative);
                    came_from.insert(next, cell);
                    seq += 1;
                    nodes_generated += 1;
                    open.push(Frontier {
                        f: tentative + self.heuristic.estimate(grid, next, goals),
                        g: tentative,
                        seq,
                        cell: next,
                    });
                }
            }
        }

        debug!(nodes_expanded, "frontier exhausted without reaching a goal");
        Ok(PathResult {
            path: Vec::new(),
            cost: f64::INFINITY,
            goal: None,
            nodes_expanded,
            nodes_generated,
            optimality_guaranteed: self.heuristic.is_admissible(),
        })
    }
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(prev) = came_from.get(&current) {
        path.push(*prev);
        current = *prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_cost(grid: &Grid, path: &[Cell]) -> f64 {
        path.iter().skip(1).filter_map(|c| grid.step_cost(*c)).sum()
    }

    #[test]
    fn open_grid_gives_manhattan_path() {
        let grid = Grid::new(10, 10).unwrap();
        let result = PathFinder::default()
            .find_path(&grid, Cell::new(0, 0), &[Cell::new(9, 9)])
            .unwrap();
        assert_eq!(result.path.len(), 19);
        assert_eq!(result.cost, 18.0);
        assert_eq!(result.path.first(), Some(&Cell::new(0, 0)));
        assert_eq!(result.path.last(), Some(&Cell::new(9, 9)));
        assert!(result.optimality_guaranteed);
    }

    #[test]
    fn path_steps_are_adjacent_and_walkable() {
        let grid: Grid = "
            .....
            .###.
            ...#.
            .#...
        "
        .parse()
        .unwrap();
        let result = PathFinder::default()
            .find_path(&grid, Cell::new(0, 0), &[Cell::new(4, 3)])
            .unwrap();
        assert!(result.found());
        for pair in result.path.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
            assert!(grid.is_walkable(pair[1]));
        }
        assert_eq!(result.cost, path_cost(&grid, &result.path));
        assert_eq!(result.cost, 7.0);
    }

    #[test]
    fn walled_off_goal_is_unreachable() {
        let grid: Grid = "..#.\n..#.\n..#.".parse().unwrap();
        let result = PathFinder::default()
            .find_path(&grid, Cell::new(0, 0), &[Cell::new(3, 0)])
            .unwrap();
        assert!(result.path.is_empty());
        assert!(result.cost.is_infinite());
        assert_eq!(result.goal, None);
        assert_eq!(result.nodes_expanded, 6);
    }

    #[test]
    fn goal_on_obstacle_is_unreachable() {
        let grid: Grid = "..#".parse().unwrap();
        let result = PathFinder::default()
            .find_path(&grid, Cell::new(0, 0), &[Cell::new(2, 0)])
            .unwrap();
        assert!(!result.found());
    }

    #[test]
    fn start_equal_to_goal_costs_nothing() {
        let grid = Grid::new(3, 3).unwrap();
        let result = PathFinder::default()
            .find_path(&grid, Cell::new(1, 1), &[Cell::new(1, 1)])
            .unwrap();
        assert_eq!(result.path, vec![Cell::new(1, 1)]);
        assert_eq!(result.cost, 0.0);
    }

    #[test]
    fn routes_around_expensive_terrain() {
        // Straight through the 5s costs 11; the detour along the bottom row costs 5.
        let grid: Grid = ".55.\n....".parse().unwrap();
        for heuristic in [Heuristic::Manhattan, Heuristic::Euclidean, Heuristic::Zero] {
            let result = PathFinder::new(heuristic)
                .find_path(&grid, Cell::new(0, 0), &[Cell::new(3, 0)])
                .unwrap();
            assert_eq!(result.cost, 5.0, "heuristic {heuristic}");
        }
    }

    #[test]
    fn picks_nearest_of_several_goals() {
        let grid = Grid::new(6, 1).unwrap();
        let result = PathFinder::default()
            .find_path(&grid, Cell::new(2, 0), &[Cell::new(5, 0), Cell::new(0, 0)])
            .unwrap();
        assert_eq!(result.goal, Some(Cell::new(0, 0)));
        assert_eq!(result.cost, 2.0);
    }

    #[test]
    fn safety_heuristic_is_flagged() {
        let grid = Grid::new(4, 4).unwrap();
        let result = PathFinder::new(Heuristic::ManhattanWithSafety)
            .find_path(&grid, Cell::new(0, 0), &[Cell::new(3, 3)])
            .unwrap();
        assert!(result.found());
        assert!(!result.optimality_guaranteed);
    }

    #[test]
    fn invalid_requests_are_errors() {
        let grid: Grid = "#..".parse().unwrap();
        let finder = PathFinder::default();
        assert!(matches!(
            finder.find_path(&grid, Cell::new(1, 0), &[]),
            Err(Error::NoGoals)
        ));
        assert!(matches!(
            finder.find_path(&grid, Cell::new(0, 0), &[Cell::new(2, 0)]),
            Err(Error::BlockedStart { x: 0, y: 0 })
        ));
        assert!(matches!(
            finder.find_path(&grid, Cell::new(1, 0), &[Cell::new(7, 0)]),
            Err(Error::OutOfBounds { .. })
        ));
    }
}
