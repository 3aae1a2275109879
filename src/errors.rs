use thiserror::Error;


/// Errors raised by the planners
/// Only configuration problems are errors - an unreachable goal is reported
/// through `PlanOutcome::found`
#[derive(Error, Debug)]
pub enum PathPlannerError {
    #[error("grid dimensions must be positive and addressable, got {nx}x{ny}")]
    InvalidDimensions { nx: usize, ny: usize },

    #[error("resolution must be positive and finite, got {0}")]
    InvalidResolution(f64),

    #[error("cost map holds {actual} cells, grid expects {expected}")]
    CostMapSizeMismatch { expected: usize, actual: usize },

    #[error("cell ({x}, {y}) lies outside the grid")]
    OutOfBounds { x: i32, y: i32 },

    #[error("no path found")]
    NoPathFound, // Unable to find a path to the goal

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}


impl From<toml::de::Error> for PathPlannerError {
    fn from(error: toml::de::Error) -> Self {
        PathPlannerError::Config(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PathPlannerError>;
