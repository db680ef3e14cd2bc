//! Rectangular grid with obstacles and terrain costs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A cell coordinate: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan (L1) distance to another cell.
    pub fn manhattan(&self, other: Cell) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(usize, usize)> for Cell {
    fn from((x, y): (usize, usize)) -> Self {
        Cell::new(x, y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl FromStr for Cell {
    type Err = Error;

    /// Parse `"x,y"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidConfiguration {
            message: format!("cell '{s}' must look like 'x,y'"),
        };
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        Ok(Cell::new(x, y))
    }
}

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// Walkable with unit cost.
    Free,
    /// Never traversable.
    Obstacle,
    /// Walkable with the given entry cost (always >= 1).
    Cost(f64),
}

impl Terrain {
    /// Decode the integer terrain map: 0 road, 1 obstacle, 2 busy street, 3 dangerous area.
    ///
    /// Unknown codes are treated as plain road.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Terrain::Obstacle,
            2 => Terrain::Cost(2.0),
            3 => Terrain::Cost(5.0),
            _ => Terrain::Free,
        }
    }

    /// Cost of stepping onto this cell, or `None` for obstacles.
    pub fn step_cost(&self) -> Option<f64> {
        match self {
            Terrain::Free => Some(1.0),
            Terrain::Obstacle => None,
            Terrain::Cost(cost) => Some(*cost),
        }
    }
}

/// Largest number of cells a grid may hold.
pub const MAX_CELLS: usize = 1 << 22;

/// A width x height grid stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Terrain>,
}

impl Grid {
    /// Create an obstacle-free grid.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGrid {
                message: format!("dimensions must be positive, got {width}x{height}"),
            });
        }
        let cells = width
            .checked_mul(height)
            .filter(|&n| n <= MAX_CELLS)
            .ok_or_else(|| Error::InvalidGrid {
                message: format!("{width}x{height} exceeds {MAX_CELLS} cells"),
            })?;
        Ok(Self {
            width,
            height,
            cells: vec![Terrain::Free; cells],
        })
    }

    /// Build a grid from rows of terrain codes (see [`Terrain::from_code`]).
    pub fn from_codes(rows: &[Vec<u8>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut grid = Grid::new(width, height)?;
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::InvalidGrid {
                    message: format!("row {y} has {} cells, expected {width}", row.len()),
                });
            }
            for (x, code) in row.iter().enumerate() {
                grid.cells[y * width + x] = Terrain::from_code(*code);
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    fn index(&self, cell: Cell) -> Result<usize> {
        if self.contains(cell) {
            Ok(cell.y * self.width + cell.x)
        } else {
            Err(Error::OutOfBounds {
                x: cell.x,
                y: cell.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Terrain at a cell, `None` outside the grid.
    pub fn terrain(&self, cell: Cell) -> Option<Terrain> {
        self.index(cell).ok().map(|i| self.cells[i])
    }

    pub fn set_obstacle(&mut self, cell: Cell) -> Result<()> {
        let i = self.index(cell)?;
        self.cells[i] = Terrain::Obstacle;
        Ok(())
    }

    /// Set a terrain cost; a cost of exactly 1 stores the cell as free.
    pub fn set_cost(&mut self, cell: Cell, cost: f64) -> Result<()> {
        if !cost.is_finite() || cost < 1.0 {
            return Err(Error::InvalidTerrainCost { cost });
        }
        let i = self.index(cell)?;
        self.cells[i] = if cost == 1.0 {
            Terrain::Free
        } else {
            Terrain::Cost(cost)
        };
        Ok(())
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.terrain(cell).and_then(|t| t.step_cost()).is_some()
    }

    /// Cost of entering `cell`, `None` for obstacles and out-of-bounds cells.
    pub fn step_cost(&self, cell: Cell) -> Option<f64> {
        self.terrain(cell).and_then(|t| t.step_cost())
    }

    /// Walkable 4-connected neighbours with their entry cost, in the order
    /// right, down, left, up.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = (Cell, f64)> + '_ {
        let candidates = [
            cell.x.checked_add(1).map(|x| Cell::new(x, cell.y)),
            cell.y.checked_add(1).map(|y| Cell::new(cell.x, y)),
            cell.x.checked_sub(1).map(|x| Cell::new(x, cell.y)),
            cell.y.checked_sub(1).map(|y| Cell::new(cell.x, y)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter_map(|next| self.step_cost(next).map(|cost| (next, cost)))
    }

    /// Smallest entry cost over all walkable cells (1.0 on an all-obstacle grid).
    pub fn min_step_cost(&self) -> f64 {
        self.cells
            .iter()
            .filter_map(Terrain::step_cost)
            .min_by(f64::total_cmp)
            .unwrap_or(1.0)
    }

    /// Number of obstacles in the 3x3 block centred on `cell`.
    pub fn obstacles_around(&self, cell: Cell) -> usize {
        let mut count = 0;
        for y in cell.y.saturating_sub(1)..=cell.y + 1 {
            for x in cell.x.saturating_sub(1)..=cell.x + 1 {
                if matches!(self.terrain(Cell::new(x, y)), Some(Terrain::Obstacle)) {
                    count += 1;
                }
            }
        }
        count
    }
}

impl FromStr for Grid {
    type Err = Error;

    /// Parse a text map: `.` free, `#` obstacle, digit `d >= 2` terrain cost `d`.
    /// Blank lines and surrounding whitespace are ignored.
    fn from_str(s: &str) -> Result<Self> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut grid = Grid::new(width, height)?;
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(Error::InvalidGrid {
                    message: format!("row {y} is not {width} cells wide"),
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let cell = Cell::new(x, y);
                match ch {
                    '.' => {}
                    '#' => grid.set_obstacle(cell)?,
                    d @ '2'..='9' => grid.set_cost(cell, f64::from(d as u8 - b'0'))?,
                    other => {
                        return Err(Error::InvalidGrid {
                            message: format!("unexpected character '{other}' at {cell}"),
                        });
                    }
                }
            }
        }
        Ok(grid)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let ch = match self.cells[y * self.width + x] {
                    Terrain::Free => '.',
                    Terrain::Obstacle => '#',
                    Terrain::Cost(c) if c < 10.0 => char::from(b'0' + c as u8),
                    Terrain::Cost(_) => '+',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_map() {
        let grid: Grid = "..#\n.3.\n...".parse().unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 3));
        assert_eq!(grid.terrain(Cell::new(2, 0)), Some(Terrain::Obstacle));
        assert_eq!(grid.step_cost(Cell::new(1, 1)), Some(3.0));
        assert_eq!(grid.step_cost(Cell::new(0, 0)), Some(1.0));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        for (width, height) in [(usize::MAX, 2), (MAX_CELLS, 2), (0, 3)] {
            assert!(matches!(Grid::new(width, height), Err(Error::InvalidGrid { .. })));
        }
        assert!(Grid::new(MAX_CELLS, 1).is_ok());
    }

    #[test]
    fn rejects_ragged_rows() {
        assert!("...\n..".parse::<Grid>().is_err());
    }

    #[test]
    fn neighbors_skip_obstacles_and_edges() {
        let grid: Grid = ".#\n..".parse().unwrap();
        let around_origin: Vec<Cell> = grid.neighbors(Cell::new(0, 0)).map(|(c, _)| c).collect();
        assert_eq!(around_origin, vec![Cell::new(0, 1)]);
    }

    #[test]
    fn terrain_codes_match_cost_table() {
        let grid = Grid::from_codes(&[vec![0, 1, 2, 3]]).unwrap();
        assert_eq!(grid.step_cost(Cell::new(0, 0)), Some(1.0));
        assert_eq!(grid.step_cost(Cell::new(1, 0)), None);
        assert_eq!(grid.step_cost(Cell::new(2, 0)), Some(2.0));
        assert_eq!(grid.step_cost(Cell::new(3, 0)), Some(5.0));
    }

    #[test]
    fn terrain_cost_below_one_is_rejected() {
        let mut grid = Grid::new(2, 2).unwrap();
        assert!(matches!(
            grid.set_cost(Cell::new(0, 0), 0.5),
            Err(Error::InvalidTerrainCost { .. })
        ));
        assert!(matches!(
            grid.set_obstacle(Cell::new(5, 0)),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn counts_obstacles_in_neighbourhood() {
        let grid: Grid = "#.#\n...\n..#".parse().unwrap();
        assert_eq!(grid.obstacles_around(Cell::new(1, 1)), 3);
        assert_eq!(grid.obstacles_around(Cell::new(0, 2)), 0);
    }
}
