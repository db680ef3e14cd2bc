//! Common test utilities for the kindness test suite.
//!
//! Reference implementations that the optimized algorithms are checked against.

#![allow(dead_code)]

use kindness::{
    adversarial::{GameTreeNode, Player},
    pathfinding::{Cell, Grid},
};

/// Cheapest cost from `start` to any of `goals` by exhaustive Dijkstra.
///
/// Uses a linear scan for the next node, so keep grids small.
///
/// # Returns
///
/// `None` when no goal is reachable.
pub fn dijkstra_cost(grid: &Grid, start: Cell, goals: &[Cell]) -> Option<f64> {
    let width = grid.width();
    let index = |c: Cell| c.y * width + c.x;
    let mut dist = vec![f64::INFINITY; width * grid.height()];
    let mut done = vec![false; dist.len()];
    dist[index(start)] = 0.0;

    loop {
        let mut current: Option<(usize, f64)> = None;
        for (i, &d) in dist.iter().enumerate() {
            if !done[i] && d.is_finite() && current.is_none_or(|(_, best)| d < best) {
                current = Some((i, d));
            }
        }
        let (i, d) = current?;
        let cell = Cell::new(i % width, i / width);
        if goals.contains(&cell) {
            return Some(d);
        }
        done[i] = true;
        for (next, step) in grid.neighbors(cell) {
            let j = index(next);
            if d + step < dist[j] {
                dist[j] = d + step;
            }
        }
    }
}

/// Plain minimax without pruning or depth limit.
pub fn full_minimax(node: &GameTreeNode) -> i64 {
    match node {
        GameTreeNode::Leaf(value) => *value,
        GameTreeNode::Branch {
            player, children, ..
        } => {
            let values = children.iter().map(full_minimax);
            match player {
                Player::Max => values.max().unwrap_or(i64::MIN),
                Player::Min => values.min().unwrap_or(i64::MAX),
            }
        }
    }
}

/// Count N-Queens solutions by checking every permutation of columns.
pub fn brute_force_queens(n: usize) -> usize {
    fn extend(columns: &mut Vec<usize>, n: usize) -> usize {
        if columns.len() == n {
            return 1;
        }
        let row = columns.len();
        let mut count = 0;
        for col in 0..n {
            let safe = columns
                .iter()
                .enumerate()
                .all(|(r, &c)| c != col && row - r != c.abs_diff(col));
            if safe {
                columns.push(col);
                count += extend(columns, n);
                columns.pop();
            }
        }
        count
    }
    extend(&mut Vec::with_capacity(n), n)
}
