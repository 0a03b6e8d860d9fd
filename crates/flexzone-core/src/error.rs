//! Unified error types for the flexzone crates
//!
//! [`FlexError`] covers defects in the grid model itself (unknown endpoints,
//! duplicate ids, malformed flow data). Algorithm crates keep their own
//! error enums and convert into `FlexError` at API boundaries when needed.
//!
//! # Example
//!
//! ```
//! use flexzone_core::{FlexError, FlexResult, Grid, GridNode, NodeId};
//!
//! fn build() -> FlexResult<Grid> {
//!     let mut grid = Grid::new();
//!     grid.add_node(GridNode::flex(NodeId::new(1), "N1"))?;
//!     Ok(grid)
//! }
//!
//! assert!(build().is_ok());
//! ```

use thiserror::Error;

/// Unified error type for grid model operations.
#[derive(Error, Debug)]
pub enum FlexError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Grid structure errors (unknown endpoints, duplicate ids)
    #[error("Network error: {0}")]
    Network(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using FlexError.
pub type FlexResult<T> = Result<T, FlexError>;

impl From<serde_json::Error> for FlexError {
    fn from(err: serde_json::Error) -> Self {
        FlexError::Parse(err.to_string())
    }
}
