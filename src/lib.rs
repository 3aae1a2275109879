//! Lazy Theta* path planning over occupancy cost maps
//!
//! The cost map is a row-major byte array, one byte per cell. Cells at or
//! above the lethal threshold are obstacles. Planners return any-angle
//! paths (Lazy Theta*) or 8-connected grid paths (A*, Dijkstra) behind the
//! common [`GlobalPlanner`] trait.
//!
//! ```
//! use lazy_theta_nav::{Cell, GlobalPlanner, LazyThetaStar};
//!
//! let planner = LazyThetaStar::new(10, 10, 0.05).unwrap();
//! let costmap = vec![0u8; 100];
//! let outcome = planner.plan(&costmap, Cell::new(0, 0), Cell::new(9, 4)).unwrap();
//!
//! assert!(outcome.found);
//! assert_eq!(outcome.path_cells(), vec![Cell::new(0, 0), Cell::new(9, 4)]);
//! ```

mod collections;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod graph_algos;
pub mod grid;
pub mod planners;
pub mod search;

pub use config::{CornerCutting, PlannerConfig, TieBreak};
pub use errors::{PathPlannerError, Result};
pub use grid::{Cell, CostMap, Grid, Node};
pub use planners::{GlobalPlanner, GridHeuristic, GridSearch, LazyThetaStar, PlanOutcome, PlannerKind, SearchStats};
