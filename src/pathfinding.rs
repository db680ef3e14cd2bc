//! Grid pathfinding with A*

pub mod astar;
pub mod grid;
pub mod heuristic;

pub use astar::{PathFinder, PathResult};
pub use grid::{Cell, Grid, Terrain};
pub use heuristic::Heuristic;
