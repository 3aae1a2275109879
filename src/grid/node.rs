use std::hash::{Hash, Hasher};

use super::{Cell, Grid};
use crate::geometry::euclidean;


/// Search state of one cell
/// Identity is the flat id alone: two nodes with the same id are the same node
#[derive(Clone, Debug)]
pub struct Node {
    pub id: usize, // row-major index, y * nx + x
    pub cell: Cell, // coordinates, always consistent with id
    pub g: f64, // cost-to-come, infinite until discovered
    pub h: f64, // euclidean estimate of cost-to-goal
    pub parent_id: Option<usize>, // any-angle predecessor, the start points at itself
}

impl Node {

    /// Fresh node with no cost and no parent
    pub fn unvisited(grid: &Grid, cell: Cell) -> Self {
        Self {
            id: grid.coordinates_to_id(cell),
            cell,
            g: f64::INFINITY,
            h: 0.0,
            parent_id: None,
        }
    }

    /// Root of a search: zero cost, its own parent
    pub fn root(grid: &Grid, cell: Cell, goal: Cell) -> Self {
        let id = grid.coordinates_to_id(cell);
        Self {
            id,
            cell,
            g: 0.0,
            h: Self::distance_between(cell, goal),
            parent_id: Some(id),
        }
    }

    /// Total estimated cost f = g + h
    pub fn f(&self) -> f64 {
        self.g + self.h
    }

    /// Straight-line distance to another node in cells
    pub fn distance(&self, other: &Node) -> f64 {
        Self::distance_between(self.cell, other.cell)
    }

    pub(crate) fn distance_between(a: Cell, b: Cell) -> f64 {
        euclidean(a.x as f64, a.y as f64, b.x as f64, b.y as f64)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id == Some(self.id)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
