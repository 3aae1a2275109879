//! 8-connected A* and Dijkstra over the cost grid
//!
//! Both run on the generic `AStar` engine and differ only in the heuristic.
//! Paths follow grid moves, so they serve as the baseline for the
//! any-angle planner.

use super::{prepare_query, GlobalPlanner, PlanOutcome, SearchStats};
use crate::config::PlannerConfig;
use crate::errors::Result;
use crate::graph_algos::a_star::AStar;
use crate::grid::{neighbors, Cell, Grid, Node};


/// Heuristic used by `GridSearch`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridHeuristic {
    Euclidean, // A*
    Zero, // Dijkstra
}


/// Grid-constrained search for a fixed grid
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: Grid,
    config: PlannerConfig,
    heuristic: GridHeuristic,
}

impl GridSearch {

    /// A* with the euclidean heuristic and default configuration
    pub fn a_star(nx: usize, ny: usize, resolution: f64) -> Result<Self> {
        Self::with_config(nx, ny, resolution, PlannerConfig::default(), GridHeuristic::Euclidean)
    }

    /// Dijkstra with default configuration
    pub fn dijkstra(nx: usize, ny: usize, resolution: f64) -> Result<Self> {
        Self::with_config(nx, ny, resolution, PlannerConfig::default(), GridHeuristic::Zero)
    }

    pub fn with_config(nx: usize, ny: usize, resolution: f64, config: PlannerConfig, heuristic: GridHeuristic) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            grid: Grid::new(nx, ny, resolution)?,
            config,
            heuristic,
        })
    }
}

impl GlobalPlanner for GridSearch {

    fn name(&self) -> &'static str {
        match self.heuristic {
            GridHeuristic::Euclidean => "a_star",
            GridHeuristic::Zero => "dijkstra",
        }
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn plan(&self, costmap: &[u8], start: Cell, goal: Cell) -> Result<PlanOutcome> {
        let Some(map) = prepare_query(&self.grid, &self.config, costmap, start, goal)? else {
            return Ok(PlanOutcome::rejected());
        };

        let engine = match self.config.max_iterations {
            Some(limit) => AStar::with_max_expansions(limit),
            None => AStar::new(),
        };

        let corner_cutting = self.config.corner_cutting;
        let heuristic = self.heuristic;

        let search = engine.search(
            start,
            move |cell: &Cell| neighbors(map, *cell, corner_cutting).map(|(node, cost)| (node.cell, cost)),
            move |cell: &Cell| match heuristic {
                GridHeuristic::Euclidean => Node::distance_between(*cell, goal),
                GridHeuristic::Zero => 0.0,
            },
            |cell: &Cell| *cell == goal,
        )?;

        let expand = search.expanded.iter()
            .map(|&(cell, g)| self.node_at(cell, g, None, goal))
            .collect();

        // rebuild the cost and parent links along the path
        let mut path: Vec<Node> = Vec::new();
        for &cell in search.path.iter().flatten() {
            let node = match path.last() {
                Some(previous) => {
                    let g = previous.g + Node::distance_between(previous.cell, cell);
                    self.node_at(cell, g, Some(previous.id), goal)
                }
                None => Node::root(&self.grid, cell, goal),
            };
            path.push(node);
        }

        let outcome = PlanOutcome {
            found: search.path.is_some(),
            path,
            expand,
            stats: SearchStats {
                pops: search.pops,
                stale_discards: search.stale_discards,
                ..SearchStats::default()
            },
        };

        tracing::debug!(
            planner = self.name(),
            found = outcome.found,
            expanded = outcome.expand.len(),
            "grid search finished"
        );

        Ok(outcome)
    }
}

impl GridSearch {

    fn node_at(&self, cell: Cell, g: f64, parent_id: Option<usize>, goal: Cell) -> Node {
        let mut node = Node::unvisited(&self.grid, cell);
        node.g = g;
        node.h = Node::distance_between(cell, goal);
        node.parent_id = parent_id;
        node
    }
}
