//! Grid planners behind a common interface
//!
//! Every planner is built for fixed grid dimensions and answers
//! `plan(costmap, start, goal)`. Only configuration problems are errors:
//! rejected queries and exhausted searches come back as an outcome with
//! `found == false`.

mod grid_search;
mod lazy_theta_star;

pub use grid_search::{GridHeuristic, GridSearch};
pub use lazy_theta_star::LazyThetaStar;

use serde::Deserialize;

use crate::config::PlannerConfig;
use crate::errors::Result;
use crate::geometry::polyline_length;
use crate::grid::{Cell, CostMap, Grid, Node};


/// A planner over a fixed-size occupancy grid
pub trait GlobalPlanner: Send + Sync {

    /// Short algorithm name for logs
    fn name(&self) -> &'static str;

    /// Grid the planner was built for
    fn grid(&self) -> &Grid;

    /// Search a path from `start` to `goal` over the borrowed cost map
    fn plan(&self, costmap: &[u8], start: Cell, goal: Cell) -> Result<PlanOutcome>;
}


/// Counters collected during one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub pops: usize, // live nodes taken off the open list
    pub stale_discards: usize, // superseded open list entries dropped
    pub repairs: usize, // lazy parents that failed validation
    pub line_of_sight_checks: usize,
}


/// Result of a `plan` call
#[derive(Debug, Clone, Default)]
pub struct PlanOutcome {
    pub found: bool,
    pub path: Vec<Node>, // start to goal inclusive, empty unless found
    pub expand: Vec<Node>, // every expanded node, in expansion order
    pub stats: SearchStats,
}

impl PlanOutcome {

    /// Query refused before searching
    pub fn rejected() -> Self {
        Self::default()
    }

    /// Path waypoints as cells
    pub fn path_cells(&self) -> Vec<Cell> {
        self.path.iter().map(|node| node.cell).collect()
    }

    /// Cells expanded during the search
    pub fn expand_cells(&self) -> Vec<Cell> {
        self.expand.iter().map(|node| node.cell).collect()
    }

    /// Path length in cells, the sum of straight segment lengths
    pub fn path_length(&self) -> f64 {
        polyline_length(self.path.iter().map(|node| (node.cell.x, node.cell.y)))
    }
}


/// Algorithm selector for building a planner at runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerKind {
    #[default]
    LazyThetaStar,
    AStar,
    Dijkstra,
}

impl PlannerKind {

    /// Build the selected planner for an `nx` x `ny` grid
    pub fn build(self, nx: usize, ny: usize, resolution: f64, config: PlannerConfig) -> Result<Box<dyn GlobalPlanner>> {
        let planner: Box<dyn GlobalPlanner> = match self {
            PlannerKind::LazyThetaStar => Box::new(LazyThetaStar::with_config(nx, ny, resolution, config)?),
            PlannerKind::AStar => Box::new(GridSearch::with_config(nx, ny, resolution, config, GridHeuristic::Euclidean)?),
            PlannerKind::Dijkstra => Box::new(GridSearch::with_config(nx, ny, resolution, config, GridHeuristic::Zero)?),
        };
        Ok(planner)
    }
}


/// Wrap the cost bytes and vet the query
/// Returns Ok(None) when start or goal is outside the grid or blocked
pub(crate) fn prepare_query<'a>(
    grid: &'a Grid,
    config: &PlannerConfig,
    costmap: &'a [u8],
    start: Cell,
    goal: Cell,
) -> Result<Option<CostMap<'a>>> {
    let map = CostMap::new(grid, costmap, config.obstacle_threshold())?;

    for (role, cell) in [("start", start), ("goal", goal)] {
        if !grid.contains(cell) {
            tracing::warn!(role, x = cell.x, y = cell.y, "query cell outside the grid");
            return Ok(None);
        }
        if map.is_blocked(cell) {
            tracing::warn!(role, x = cell.x, y = cell.y, "query cell is an obstacle");
            return Ok(None);
        }
    }

    Ok(Some(map))
}
