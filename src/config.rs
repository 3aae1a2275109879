//! Planner configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.

use crate::errors::{PathPlannerError, Result};
use serde::Deserialize;
use std::path::Path;


/// Cost at or above which a cell is treated as an obstacle
/// Matches the inscribed-inflated value used by common costmap layers
pub const DEFAULT_LETHAL_COST: u8 = 253;


/// How diagonal moves squeeze past blocked cells
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerCutting {
    /// Diagonal moves are allowed whatever the flanking cells hold
    Allow,
    /// Diagonal moves are rejected when both flanking axis cells are blocked
    #[default]
    BothBlocked,
    /// Diagonal moves are rejected when either flanking axis cell is blocked
    AnyBlocked,
}


/// Ordering between open-list entries with equal f cost
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Prefer the entry closer to the goal (smaller h)
    #[default]
    LowerH,
    /// First pushed, first popped
    InsertionOrder,
}


/// Configuration shared by every grid planner
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Base lethal threshold
    pub lethal_cost: u8,

    /// Scales `lethal_cost`; a cell is blocked when cost >= lethal_cost * obstacle_factor
    pub obstacle_factor: f64,

    /// Diagonal motion policy
    pub corner_cutting: CornerCutting,

    /// Open-list tie-break policy
    pub tie_break: TieBreak,

    /// Maximum number of open-list pops before the search gives up
    pub max_iterations: Option<usize>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lethal_cost: DEFAULT_LETHAL_COST,
            obstacle_factor: 1.0,
            corner_cutting: CornerCutting::default(),
            tie_break: TieBreak::default(),
            max_iterations: None,
        }
    }
}

impl PlannerConfig {

    /// Parse a config from a TOML document and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Reject values the planners cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.obstacle_factor > 0.0 && self.obstacle_factor <= 1.0) {
            return Err(PathPlannerError::Config(format!(
                "obstacle_factor must be in (0, 1], got {}",
                self.obstacle_factor
            )));
        }
        if self.max_iterations == Some(0) {
            return Err(PathPlannerError::Config("max_iterations must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Effective obstacle threshold after applying the factor
    pub fn obstacle_threshold(&self) -> f64 {
        self.lethal_cost as f64 * self.obstacle_factor
    }
}
