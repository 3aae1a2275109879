//! Occupancy grid model
//!
//! Cells are addressed by integer coordinates and by a flat row-major id
//! (`id = y * nx + x`). The cost bytes are borrowed for the length of one
//! planning call and never copied.

pub mod line_of_sight;
pub mod motion;
mod node;

pub use line_of_sight::line_of_sight;
pub use motion::{Motion, MOTIONS, neighbors};
pub use node::Node;

use crate::errors::{PathPlannerError, Result};


/// Integer cell coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}


/// Grid dimensions and resolution
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    nx: usize,
    ny: usize,
    resolution: f64, // world units per cell
}

impl Grid {

    /// Create a grid, rejecting empty or unaddressable dimensions and a non-positive resolution
    pub fn new(nx: usize, ny: usize, resolution: f64) -> Result<Self> {
        // coordinates are signed 32-bit so neighbour offsets can go negative,
        // and the search arenas index cells with u32
        let addressable = nx > 0
            && ny > 0
            && nx <= i32::MAX as usize
            && ny <= i32::MAX as usize
            && nx.checked_mul(ny).is_some_and(|size| size < u32::MAX as usize);
        if !addressable {
            return Err(PathPlannerError::InvalidDimensions { nx, ny });
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(PathPlannerError::InvalidResolution(resolution));
        }
        Ok(Self { nx, ny, resolution })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Number of cells
    pub fn size(&self) -> usize {
        self.nx * self.ny
    }

    /// True if the cell lies in [0, nx) x [0, ny)
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.nx && (cell.y as usize) < self.ny
    }

    /// Flat index of an in-bounds cell
    pub fn coordinates_to_id(&self, cell: Cell) -> usize {
        debug_assert!(self.contains(cell), "cell {cell:?} outside {}x{} grid", self.nx, self.ny);
        cell.y as usize * self.nx + cell.x as usize
    }

    /// Flat index, or None when the cell is outside the grid
    pub fn checked_id(&self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some(self.coordinates_to_id(cell))
        } else {
            None
        }
    }

    /// Inverse of `coordinates_to_id`
    pub fn id_to_coordinates(&self, id: usize) -> Cell {
        debug_assert!(id < self.size(), "id {id} outside {}x{} grid", self.nx, self.ny);
        Cell::new((id % self.nx) as i32, (id / self.nx) as i32)
    }

    /// Scale a distance in cells to world units
    pub fn to_world(&self, distance: f64) -> f64 {
        distance * self.resolution
    }
}


/// Borrowed view of a cost map laid over a grid
#[derive(Clone, Copy, Debug)]
pub struct CostMap<'a> {
    grid: &'a Grid,
    costs: &'a [u8],
    threshold: f64, // cost >= threshold is an obstacle
}

impl<'a> CostMap<'a> {

    /// Wrap cost bytes, checking they cover the grid exactly
    pub fn new(grid: &'a Grid, costs: &'a [u8], threshold: f64) -> Result<Self> {
        if costs.len() != grid.size() {
            return Err(PathPlannerError::CostMapSizeMismatch {
                expected: grid.size(),
                actual: costs.len(),
            });
        }
        Ok(Self { grid, costs, threshold })
    }

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// Cost byte of a cell
    pub fn cost(&self, cell: Cell) -> Result<u8> {
        match self.grid.checked_id(cell) {
            Some(id) => Ok(self.costs[id]),
            None => Err(PathPlannerError::OutOfBounds { x: cell.x, y: cell.y }),
        }
    }

    /// Obstacle test; cells outside the grid count as blocked
    pub fn is_blocked(&self, cell: Cell) -> bool {
        match self.grid.checked_id(cell) {
            Some(id) => self.is_blocked_id(id),
            None => true,
        }
    }

    /// Obstacle test by flat index
    pub fn is_blocked_id(&self, id: usize) -> bool {
        self.costs[id] as f64 >= self.threshold
    }
}
