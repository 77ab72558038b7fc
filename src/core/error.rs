//! Error types for the boundary node and its scene graph

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("LOD table has {levels} levels but the node has {children} children")]
    LevelCountMismatch { levels: usize, children: usize },

    #[error("LOD level {index} ({value}) is not greater than the previous level ({previous})")]
    LevelsNotAscending { index: usize, previous: f64, value: f64 },

    #[error("Boundary extent `{field}` is not finite")]
    NonFiniteExtent { field: &'static str },

    #[error("Scene node {0} not found")]
    NodeNotFound(u64),

    #[error("Scene node {0} is not a boundary node")]
    NotABoundary(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error came from rejected node configuration.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::LevelCountMismatch { .. }
                | Error::LevelsNotAscending { .. }
                | Error::NonFiniteExtent { .. }
        )
    }
}
